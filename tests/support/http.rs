//! Minimal scripted HTTP/1.1 server for exercising the fetch client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Reply {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

#[derive(Default)]
struct Routes {
    /// Replies per path, served in order; the last one repeats.
    replies: HashMap<String, Vec<Reply>>,
    served: HashMap<String, usize>,
}

impl Routes {
    fn next(&mut self, path: &str) -> Reply {
        let Some(replies) = self.replies.get(path) else {
            return Reply::status(404, "no route");
        };
        let served = self.served.entry(path.to_string()).or_default();
        let reply = replies[(*served).min(replies.len() - 1)].clone();
        *served += 1;
        reply
    }
}

pub struct MockServer {
    addr: SocketAddr,
    routes: Arc<Mutex<Routes>>,
    hits: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let routes = Arc::new(Mutex::new(Routes::default()));
        let hits = Arc::new(AtomicUsize::new(0));

        let (task_routes, task_hits) = (Arc::clone(&routes), Arc::clone(&hits));
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&task_routes);
                let hits = Arc::clone(&task_hits);
                tokio::spawn(async move {
                    let _ = serve(stream, routes, hits).await;
                });
            }
        });

        Self { addr, routes, hits }
    }

    /// Serve `replies` in order for `path` (query string ignored).
    pub fn route(&self, path: &str, replies: Vec<Reply>) {
        self.routes.lock().replies.insert(path.to_string(), replies);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: Arc<Mutex<Routes>>,
    hits: Arc<AtomicUsize>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&buf);
    let target = request.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();
    hits.fetch_add(1, Ordering::SeqCst);
    let reply = routes.lock().next(&path);

    let mut head = format!(
        "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(reply.body.as_bytes()).await?;
    stream.shutdown().await
}

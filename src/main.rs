use clap::Parser;

use listwatch::adapter::inbound::cli::command::Cli;
use listwatch::adapter::inbound::cli::{handler, output};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = handler::execute(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

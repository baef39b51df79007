//! Running Diesel work on the blocking pool.
//!
//! Store futures hand their work to `spawn_blocking`. Dropping the future
//! flips a [`CancelToken`]; transactions check it between steps and before
//! commit, and roll back once it is set.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::database::connection::{connect, DbConnection, DbPool};
use crate::error::{Error, Result};

/// Observed by blocking work; set when the awaiting future goes away.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// # Errors
    /// Returns [`Error::Cancelled`] once the token is set.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Cancels its token on drop unless disarmed.
struct CancelOnDrop {
    token: CancelToken,
    armed: bool,
}

impl CancelOnDrop {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.token.cancel();
        }
    }
}

/// Run `work` with a pooled connection on the blocking pool.
pub(crate) async fn run_blocking<T, F>(pool: &DbPool, work: F) -> Result<T>
where
    F: FnOnce(&mut DbConnection, &CancelToken) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let token = CancelToken::default();
    let guard = CancelOnDrop {
        token: token.clone(),
        armed: true,
    };
    let pool = pool.clone();

    let joined = tokio::task::spawn_blocking(move || {
        let mut conn = connect(&pool)?;
        work(&mut conn, &token)
    })
    .await;
    guard.disarm();

    joined.map_err(|e| Error::Database(format!("blocking task failed: {e}")))?
}

/// In-process mutexes keyed by exchange or list id.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Mutex for `key`, created on first use.
    #[must_use]
    pub fn get(&self, key: &K) -> Arc<Mutex<()>> {
        self.locks.entry(key.clone()).or_default().clone()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

//! Coalescing of concurrent requests that share a key

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, StockError};

type SharedResult<V> = Shared<BoxFuture<'static, Result<V>>>;

/// Registry of in-flight tasks keyed by request
///
/// While a task for a key is running, further `run` calls with that key await the same
/// result instead of starting their own. Tasks are spawned, so they finish even if every
/// caller stops waiting.
pub struct SingleFlight<K, V> {
    in_flight: Arc<Mutex<HashMap<K, SharedResult<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` unless a task for `key` is already in flight, then share its result
    ///
    /// `task` is dropped unpolled when joining an existing flight. The registry entry is
    /// removed once, by the task itself, when it settles. A panicking task settles as
    /// `Internal`.
    pub async fn run<F>(&self, key: K, task: F) -> Result<V>
    where
        F: Future<Output = Result<V>> + Send + 'static,
    {
        let pending = {
            let mut in_flight = self.in_flight.lock().await;

            if let Some(pending) = in_flight.get(&key) {
                debug!(%key, "joining in-flight request");
                pending.clone()
            } else {
                let registry = Arc::clone(&self.in_flight);
                let task_key = key.clone();
                // The registry lock is held until the entry is inserted below, so the
                // task cannot remove its entry before it exists.
                let handle = tokio::spawn(async move {
                    let result = AssertUnwindSafe(task).catch_unwind().await.unwrap_or_else(|_| {
                        Err(StockError::Internal(format!("fetch task for {task_key} panicked")))
                    });
                    registry.lock().await.remove(&task_key);
                    result
                });

                let pending = async move {
                    handle.await.unwrap_or_else(|e| {
                        Err(StockError::Internal(format!("fetch task did not complete: {e}")))
                    })
                }
                .boxed()
                .shared();

                in_flight.insert(key, pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Number of keys with a task in flight
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

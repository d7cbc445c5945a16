use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use store_object::OperationResult;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::handle::CompletionHandle;

/// Runs store operations on background tasks
///
/// Each call gets its own task and its own one-shot channel; the caller joins
/// results in whatever order it likes. Clones share the operation counter.
#[derive(Debug, Clone)]
pub struct OperationRunner {
    runtime: Handle,
    next_operation: Arc<AtomicU64>,
}

impl OperationRunner {
    /// Runner on the current Tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Runner on an explicit runtime
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_operation: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start `operation` on its own task
    pub fn run<F, T>(&self, operation: F) -> CompletionHandle<T>
    where
        F: Future<Output = OperationResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let id = self.next_id();

        self.runtime.spawn(async move {
            let result = operation.await;
            deliver(id, sender, result);
        });

        CompletionHandle::new(id, receiver)
    }

    /// Start a synchronous `operation` on the blocking pool
    pub fn run_blocking<F, T>(&self, operation: F) -> CompletionHandle<T>
    where
        F: FnOnce() -> OperationResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let id = self.next_id();

        self.runtime.spawn_blocking(move || {
            let result = operation();
            deliver(id, sender, result);
        });

        CompletionHandle::new(id, receiver)
    }

    fn next_id(&self) -> u64 {
        self.next_operation.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for OperationRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver<T>(id: u64, sender: oneshot::Sender<OperationResult<T>>, result: OperationResult<T>) {
    if let Err(err) = &result {
        tracing::debug!(operation = id, error = %err, "operation failed");
    }
    if sender.send(result).is_err() {
        tracing::debug!(operation = id, "completion handle dropped before delivery");
    }
}

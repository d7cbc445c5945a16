//! Single-use completion handles

use std::time::Duration;
use store_object::{OperationResult, StoreError};
use tokio::sync::oneshot;

/// Eventual result of an operation started by an
/// [`OperationRunner`](crate::OperationRunner)
///
/// The result can be taken exactly once. A second `wait` fails with
/// [`StoreError::DoubleAwait`]. Dropping an in-flight `wait` future (a lost
/// `tokio::select!` branch, an elapsed timeout) leaves the handle usable.
#[derive(Debug)]
pub struct CompletionHandle<T> {
    operation: u64,
    receiver: oneshot::Receiver<OperationResult<T>>,
    consumed: bool,
}

impl<T> CompletionHandle<T> {
    pub(crate) fn new(operation: u64, receiver: oneshot::Receiver<OperationResult<T>>) -> Self {
        Self {
            operation,
            receiver,
            consumed: false,
        }
    }

    /// Sequence number the runner gave this operation
    pub fn operation(&self) -> u64 {
        self.operation
    }

    /// Whether the result has already been taken
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Wait for the operation and take its result
    pub async fn wait(&mut self) -> OperationResult<T> {
        if self.consumed {
            return Err(StoreError::DoubleAwait {
                operation: self.operation,
            });
        }

        let delivered = (&mut self.receiver).await;
        self.consumed = true;

        match delivered {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation = self.operation,
                    "operation task ended without reporting a result"
                );
                Err(StoreError::OperationAborted {
                    operation: self.operation,
                })
            }
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`
    ///
    /// `None` means the deadline passed; the handle can be waited on again.
    pub async fn wait_timeout(&mut self, timeout: Duration) -> Option<OperationResult<T>> {
        tokio::time::timeout(timeout, self.wait()).await.ok()
    }
}

/// Wait on every handle in order, collecting the results in the same order
pub async fn wait_all<T>(handles: Vec<CompletionHandle<T>>) -> Vec<OperationResult<T>> {
    let mut results = Vec::with_capacity(handles.len());
    for mut handle in handles {
        results.push(handle.wait().await);
    }
    results
}

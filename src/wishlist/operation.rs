use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::firestore::error::{internal_error, FirestoreResult};
use crate::platform::runtime::spawn_detached;

const PENDING: u8 = 0;
const SUCCEEDED: u8 = 1;
const FAILED: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Handle to a store operation running in the background.
///
/// The status can be polled at any time; the result is delivered once,
/// through [`OperationHandle::wait`] or [`OperationHandle::try_take`].
/// Dropping the handle does not cancel the operation.
#[derive(Debug)]
pub struct OperationHandle<T> {
    status: Arc<AtomicU8>,
    receiver: oneshot::Receiver<FirestoreResult<T>>,
}

impl<T> OperationHandle<T>
where
    T: Send + 'static,
{
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = FirestoreResult<T>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let status = Arc::new(AtomicU8::new(PENDING));
        let task_status = status.clone();
        spawn_detached(async move {
            let result = future.await;
            let outcome = if result.is_ok() { SUCCEEDED } else { FAILED };
            task_status.store(outcome, Ordering::SeqCst);
            let _ = sender.send(result);
        });
        Self { status, receiver }
    }

    pub fn status(&self) -> OperationStatus {
        match self.status.load(Ordering::SeqCst) {
            PENDING => OperationStatus::Pending,
            SUCCEEDED => OperationStatus::Succeeded,
            _ => OperationStatus::Failed,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status() != OperationStatus::Pending
    }

    /// Waits for the operation to finish and returns its result.
    pub async fn wait(self) -> FirestoreResult<T> {
        self.receiver
            .await
            .map_err(|_| internal_error("operation ended without reporting a result"))?
    }

    /// Returns the result if the operation has finished and it was not taken yet.
    pub fn try_take(&mut self) -> Option<FirestoreResult<T>> {
        self.receiver.try_recv().ok()
    }
}

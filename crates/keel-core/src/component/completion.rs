use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::component::{BoxError, ComponentResult};

/// Outcome returned directly from a component operation
#[derive(Debug)]
pub enum Signal<T> {
    /// The operation finished with this result
    Ready(ComponentResult<T>),
    /// The result will arrive through the [`Completion`] handle
    Deferred,
}

impl<T> Signal<T> {
    pub fn ok(value: T) -> Self {
        Signal::Ready(Ok(value))
    }

    pub fn err(error: impl Into<BoxError>) -> Self {
        Signal::Ready(Err(error.into()))
    }
}

impl<T> From<ComponentResult<T>> for Signal<T> {
    fn from(result: ComponentResult<T>) -> Self {
        Signal::Ready(result)
    }
}

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<ComponentResult<T>>>>>;

/// Settle-once completion handle handed to component operations.
///
/// Clones share one slot. The first call to [`complete`](Completion::complete)
/// delivers the outcome; later calls return `false` and change nothing.
pub struct Completion<T> {
    component: Arc<str>,
    slot: Slot<T>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("component", &self.component)
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<T> Completion<T> {
    /// Create a handle and the receiver the runner waits on
    pub(crate) fn channel(component: &str) -> (Self, oneshot::Receiver<ComponentResult<T>>) {
        let (sender, receiver) = oneshot::channel();
        let completion = Self {
            component: Arc::from(component),
            slot: Arc::new(Mutex::new(Some(sender))),
        };
        (completion, receiver)
    }

    /// Name of the component this handle belongs to
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Deliver the outcome. Returns `false` if the operation was already settled.
    pub fn complete(&self, result: ComponentResult<T>) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(sender) => {
                // The runner may have given up waiting; nothing left to notify.
                let _ = sender.send(result);
                true
            }
            None => {
                log::warn!(
                    "Ignoring duplicate completion signal from component {}",
                    self.component
                );
                false
            }
        }
    }

    pub fn succeed(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    pub fn fail(&self, error: impl Into<BoxError>) -> bool {
        self.complete(Err(error.into()))
    }

    pub fn is_settled(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Drive one component operation until either channel settles it.
///
/// Returns `None` when the operation deferred and every completion handle
/// was dropped without settling. Once the handle settles first, the
/// operation future is no longer polled.
pub(crate) async fn settle<T, F>(
    completion: Completion<T>,
    mut receiver: oneshot::Receiver<ComponentResult<T>>,
    operation: F,
) -> Option<ComponentResult<T>>
where
    F: Future<Output = Signal<T>>,
{
    tokio::pin!(operation);
    let signal = tokio::select! {
        biased;
        settled = &mut receiver => return settled.ok(),
        signal = &mut operation => signal,
    };
    if let Signal::Ready(result) = signal {
        completion.complete(result);
    }
    drop(completion);
    receiver.await.ok()
}

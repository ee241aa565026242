//! # Keel Core Components
//!
//! A component is a named unit with a start operation and an optional stop
//! operation. Everything the lifecycle runner drives goes through the
//! [`Component`] trait; plain values and grouping nodes are adapted into it
//! once, at registration time (see [`Runnable`]).
//!
//! ## Completion protocol
//!
//! A component reports the outcome of `start`/`stop` through either of two
//! channels, without declaring up front which one it uses:
//!
//! - **Returned signal**: resolve the async method with
//!   [`Signal::Ready`] carrying the result.
//! - **Completion handle**: resolve with [`Signal::Deferred`] and settle the
//!   supplied [`Completion`] later, from any task.
//!
//! The first settlement wins. Anything arriving afterwards is logged and
//! ignored.
pub mod adapter;
pub mod completion;
pub mod runnable;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::value::Value;

pub use adapter::{from_fn, FnComponent, Identity, PassThrough};
pub use completion::{Completion, Signal};
pub use runnable::{Runnable, RunnableKind};

/// Error type reported by component operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a component operation
pub type ComponentResult<T> = std::result::Result<T, BoxError>;

/// Owned, sendable future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle capability implemented by every component
#[async_trait]
pub trait Component: Send + Sync {
    /// Start the component with the dependency bag assembled for it.
    /// The started value becomes this component's entry in the running system.
    async fn start(&self, dependencies: Value, completion: Completion<Value>) -> Signal<Value>;

    /// Stop the component. Components with nothing to release keep the default.
    async fn stop(&self, _completion: Completion<()>) -> Signal<()> {
        Signal::Ready(Ok(()))
    }
}

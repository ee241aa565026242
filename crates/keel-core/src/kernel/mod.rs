//! # Keel Core Kernel
//!
//! The kernel ties the subsystems together behind [`System`], the facade
//! applications hold on to. A system owns a component [`Registry`](crate::registry::Registry)
//! and a lifecycle runner, and exposes:
//!
//! - **Definition**: `register`/`replace`/`remove`/`depends_on`/`include`
//!   (see [`system::Definition`] for the per-definition builder).
//! - **Lifecycle**: `start`, `stop` and `restart`, either awaited or with a
//!   completion callback (`start_with` and friends).
//! - **Introspection**: the published [`LifecycleState`](crate::lifecycle::LifecycleState),
//!   registry snapshots and the computed start/stop orders.
//!
//! ## Submodules
//!
//! - [`constants`]: separators, reserved names and log targets.
//! - [`error`]: the crate-level [`Error`](error::Error) and `Result`.
//! - [`system`]: the [`System`] facade and its options.
pub mod constants;
pub mod error;
pub mod system;

pub use system::{Definition, System, SystemOptions};

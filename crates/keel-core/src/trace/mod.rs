//! # Keel Core Trace Sink
//!
//! Human-readable trace lines about what a system is doing (registering,
//! resolving, starting, stopping) go to a [`TraceSink`] chosen when the
//! system is built. The engine never reads the environment to decide where
//! they end up.
use std::fmt;
use std::sync::Arc;

use crate::kernel::constants::TRACE_TARGET;

/// Receiver of trace lines emitted by a system
pub trait TraceSink: Send + Sync {
    fn trace(&self, system: &str, args: fmt::Arguments<'_>);
}

/// Forwards trace lines to the `log` facade at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn trace(&self, system: &str, args: fmt::Arguments<'_>) {
        log::debug!(target: TRACE_TARGET, "[{}] {}", system, args);
    }
}

/// Discards every trace line
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn trace(&self, _system: &str, _args: fmt::Arguments<'_>) {}
}

impl<T: TraceSink + ?Sized> TraceSink for Arc<T> {
    fn trace(&self, system: &str, args: fmt::Arguments<'_>) {
        (**self).trace(system, args)
    }
}

/// Trace sink bound to one system name
#[derive(Clone)]
pub(crate) struct Tracer {
    system: Arc<str>,
    sink: Arc<dyn TraceSink>,
}

impl Tracer {
    pub(crate) fn new(system: Arc<str>, sink: Arc<dyn TraceSink>) -> Self {
        Self { system, sink }
    }

    pub(crate) fn system(&self) -> &str {
        &self.system
    }

    pub(crate) fn trace(&self, args: fmt::Arguments<'_>) {
        self.sink.trace(&self.system, args);
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("system", &self.system).finish_non_exhaustive()
    }
}

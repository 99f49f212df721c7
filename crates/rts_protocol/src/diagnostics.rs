//! Where the codec reports dropped orders.

/// Fire-and-forget receiver for decode diagnostics.
///
/// Implementations must not panic; a failing sink would turn a dropped
/// order back into a crash.
pub trait DiagnosticSink {
    /// Report `message` on `channel`.
    fn report(&self, channel: &str, message: &str);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, channel: &str, message: &str) {
        (**self).report(channel, message);
    }
}

/// Forwards diagnostics to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, channel: &str, message: &str) {
        tracing::debug!(channel, "{message}");
    }
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _channel: &str, _message: &str) {}
}

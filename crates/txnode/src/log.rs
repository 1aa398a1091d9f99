/// Sink for the error reports emitted while unwinding a chain.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorLog: Send + Sync {
    fn error(&self, message: &str);
}

/// Forwards reports to the global `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl ErrorLog for TracingLog {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

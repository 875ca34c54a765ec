//! Telemetry utilities for command timing and span construction.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors for IRC observability.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, debug_span, info_span};

    /// Create a span for a client connection.
    pub fn connection(uid: &str, addr: &SocketAddr) -> Span {
        info_span!("connection", uid = %uid, addr = %addr)
    }

    /// Create a span for a command execution.
    pub fn command(name: &str, uid: &str) -> Span {
        debug_span!("irc.command", command = %name, uid = %uid)
    }
}

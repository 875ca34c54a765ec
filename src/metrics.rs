//! Prometheus metrics collection for tinyircd.
//!
//! Metrics live in a process-wide registry and are exposed on the optional
//! HTTP endpoint (see [`crate::http`]).
//!
//! - `irc_command_total{command}` - Commands processed by type
//! - `irc_command_duration_seconds{command}` - Command latency histogram
//! - `irc_command_errors_total{command, error}` - Handler failures by kind
//! - `irc_join_refusals_total{reason}` - Refused JOINs by refusal reason
//! - `irc_deliveries_dropped_total` - Fan-out lost to a full connection queue

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Total messages written to clients.
pub static MESSAGES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Total TCP connections accepted.
pub static CONNECTIONS_ACCEPTED: OnceLock<IntCounter> = OnceLock::new();

/// Connections closed because a PING went unanswered.
pub static PING_TIMEOUTS: OnceLock<IntCounter> = OnceLock::new();

/// Commands processed by type (NICK, JOIN, PART, etc.).
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command processing latency by command type.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by type and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// JOINs refused by a channel, by reason.
pub static JOIN_REFUSALS: OnceLock<IntCounterVec> = OnceLock::new();

/// Commands answered with RPL_TRYAGAIN (or swallowed silently).
pub static DROPPED_COMMANDS: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages for other connections lost because their queue was full.
pub static DELIVERIES_DROPPED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Currently registered users.
pub static REGISTERED_USERS: OnceLock<IntGauge> = OnceLock::new();

/// Channels currently held by the channel directory.
pub static ACTIVE_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Called once at server startup. Later calls are no-ops.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(MESSAGES_SENT, IntCounter::new("irc_messages_sent_total", "Total messages sent"));
    register!(CONNECTIONS_ACCEPTED, IntCounter::new("irc_connections_accepted_total", "TCP connections accepted"));
    register!(PING_TIMEOUTS, IntCounter::new("irc_ping_timeouts_total", "Connections closed by ping timeout"));
    register!(DELIVERIES_DROPPED, IntCounter::new("irc_deliveries_dropped_total", "Messages dropped on a full connection queue"));
    register!(REGISTERED_USERS, IntGauge::new("irc_registered_users", "Currently registered users"));
    register!(ACTIVE_CHANNELS, IntGauge::new("irc_active_channels", "Active channels"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("irc_command_total", "IRC commands processed by type"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("irc_command_duration_seconds", "IRC command latency by type")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("irc_command_errors_total", "IRC command errors by type"), &["command", "error"]));
    register!(JOIN_REFUSALS, IntCounterVec::new(Opts::new("irc_join_refusals_total", "JOINs refused by reason"), &["reason"]));
    register!(DROPPED_COMMANDS, IntCounterVec::new(Opts::new("irc_dropped_commands_total", "Commands dropped for retry"), &["command"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn record_join_refusal(reason: &str) {
    if let Some(c) = JOIN_REFUSALS.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_dropped(command: &str) {
    if let Some(c) = DROPPED_COMMANDS.get() {
        c.with_label_values(&[command]).inc();
    }
}

#[inline]
pub fn inc_counter(metric: &OnceLock<IntCounter>) {
    if let Some(c) = metric.get() {
        c.inc();
    }
}

#[inline]
pub fn add_gauge(metric: &OnceLock<IntGauge>, delta: i64) {
    if let Some(g) = metric.get() {
        g.add(delta);
    }
}

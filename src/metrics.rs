//! Metrics for the dashboard core.
//!
//! Records through the `metrics` facade only; the embedding process
//! decides whether a recorder (Prometheus or otherwise) is installed.
//! Without one, every call is a no-op.

use metrics::{counter, describe_counter};

// -- Metric name constants ----------------------------------------------------

/// Total topology polls (counter). Labels: outcome (ok | http | transport | malformed).
pub const POLLS_TOTAL: &str = "kvdash_polls_total";

/// Total admin commands issued (counter). Labels: operation, outcome (accepted | rejected | transport).
pub const ADMIN_COMMANDS_TOTAL: &str = "kvdash_admin_commands_total";

/// Register metric descriptions with whatever recorder is installed.
pub fn describe_metrics() {
    describe_counter!(POLLS_TOTAL, "Total topology polls by outcome");
    describe_counter!(
        ADMIN_COMMANDS_TOTAL,
        "Total admin commands by operation and outcome"
    );
}

/// Record the outcome of one topology poll.
pub fn record_poll(outcome: &'static str) {
    counter!(POLLS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record the outcome of one admin command.
pub fn record_admin_command(operation: &'static str, outcome: &'static str) {
    counter!(ADMIN_COMMANDS_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
}

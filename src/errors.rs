//! Typed errors for topology reads and admin commands.
//!
//! Two separate families with different propagation rules:
//! [`FetchError`] covers the topology read path and never escapes the
//! poll loop -- it is converted into a stale-state signal there.
//! [`AdminError`] covers the six control-plane operations and propagates
//! synchronously to the caller so a specific failure message can be
//! shown; it is never retried automatically and never swallowed.

use thiserror::Error;

/// Failure while reading the cluster topology.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure talking to the control endpoint.
    #[error("topology fetch failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The control endpoint answered with a non-2xx status.
    #[error("control endpoint returned HTTP {status}")]
    Http { status: u16 },

    /// The payload did not match the expected shards -> nodes shape
    /// (missing `shards` key, non-numeric `id`/`port`, ...).  Kept
    /// distinct from [`FetchError::Transport`] so logs can tell a broken
    /// endpoint apart from a broken network.
    #[error("malformed topology payload: {0}")]
    MalformedTopology(#[source] serde_json::Error),
}

impl FetchError {
    /// Whether this is a payload-shape violation rather than a
    /// transport/HTTP failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::MalformedTopology(_))
    }
}

/// Failure of one of the six administrative operations.
///
/// Each variant carries the HTTP status and the control plane's own
/// error message so the caller can render the specific reason.  A failed
/// call leaves cluster state exactly as observed on the next poll -- the
/// client never mutates any cached snapshot optimistically.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Node registration was rejected (duplicate address, capacity
    /// validation, ...).
    #[error("add node failed (HTTP {status}): {message}")]
    AddNodeFailed { status: u16, message: String },

    /// Node removal was rejected (node not found, removal would drop a
    /// shard below minimum replication, ...).
    #[error("remove node failed (HTTP {status}): {message}")]
    RemoveNodeFailed { status: u16, message: String },

    /// Partition increase/decrease was rejected.
    #[error("partition resize failed (HTTP {status}): {message}")]
    PartitionResizeFailed { status: u16, message: String },

    /// Leadership transfer was rejected (target not a member, target not
    /// healthy, ...).
    #[error("leader change failed (HTTP {status}): {message}")]
    LeaderChangeFailed { status: u16, message: String },

    /// Replica relocation was rejected (destination already holds a
    /// replica of the partition, ...).
    #[error("partition move failed (HTTP {status}): {message}")]
    PartitionMoveFailed { status: u16, message: String },

    /// Network-level failure before any control-plane answer arrived.
    #[error("admin request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AdminError {
    /// Name of the operation this error belongs to, for logs and metrics.
    pub fn operation(&self) -> &'static str {
        match self {
            AdminError::AddNodeFailed { .. } => "add_node",
            AdminError::RemoveNodeFailed { .. } => "remove_node",
            AdminError::PartitionResizeFailed { .. } => "resize_partitions",
            AdminError::LeaderChangeFailed { .. } => "change_partition_leader",
            AdminError::PartitionMoveFailed { .. } => "move_partition",
            AdminError::Transport(_) => "transport",
        }
    }
}

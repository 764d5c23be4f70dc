//! kvdash library -- dashboard core for a sharded, replicated KV cluster.
//!
//! This crate models the externally observable shape of the cluster
//! (shards, nodes, statuses), derives cluster-wide health statistics
//! from each topology snapshot, and drives the administrative control
//! contract (node lifecycle, partition resizing, leadership transfer,
//! replica placement) against the cluster's control endpoint.  The
//! actual replication and consensus machinery lives in the cluster;
//! this core only issues commands and observes eventual state.

pub mod admin;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod poller;
pub mod stats;
pub mod status;
pub mod topology;

pub use admin::AdminClient;
pub use errors::{AdminError, FetchError};
pub use poller::{PollSnapshot, PollState, Poller, PollerHandle};
pub use stats::{aggregate, ClusterStats};
pub use status::{normalize, CanonicalStatus};
pub use topology::{Address, Cluster, Node, NodeType};

//! Cluster topology snapshot types.
//!
//! The control endpoint reports the cluster as a nested shard -> nodes
//! mapping.  Each successful poll replaces the whole [`Cluster`] value;
//! there is no incremental patching or merging with the prior snapshot,
//! so a snapshot can be treated as an immutable value by everything
//! downstream of the fetch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::FetchError;

/// Network location of a node.  Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// IP address or hostname.
    pub ip: String,
    /// TCP port.
    pub port: u16,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Role of a node within its shard.
///
/// Open string on the wire (`MASTER`, `FOLLOWER`, ...); anything this
/// build does not recognize deserializes as `Unknown` instead of failing
/// the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// Leader-capable replica.
    Master,
    /// Read replica that follows the shard leader.
    Follower,
    /// Role string not recognized by this build.
    Unknown,
}

impl Default for NodeType {
    fn default() -> Self {
        NodeType::Unknown
    }
}

impl From<String> for NodeType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "MASTER" => NodeType::Master,
            "FOLLOWER" => NodeType::Follower,
            _ => NodeType::Unknown,
        }
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        match t {
            NodeType::Master => "MASTER".to_string(),
            NodeType::Follower => "FOLLOWER".to_string(),
            NodeType::Unknown => "UNKNOWN".to_string(),
        }
    }
}

/// One replica process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Cluster-unique identifier, stable for the node's lifetime.
    pub id: u64,
    /// Network location.
    pub address: Address,
    /// Role within the shard.
    #[serde(default)]
    pub node_type: NodeType,
    /// Shard this node replicates.
    pub shard_key: u64,
    /// Id of the node currently acting as leader for this node's shard
    /// (may equal this node's own id).
    pub leader_id: u64,
    /// Raw status string as reported by the cluster.  Canonicalized by
    /// [`crate::status::normalize`] before any counting.
    pub status: String,
}

impl Node {
    /// Whether this node believes itself to be its shard's leader.
    pub fn is_leader(&self) -> bool {
        self.id == self.leader_id
    }
}

/// Root cluster snapshot: shard id -> ordered member list.
///
/// `BTreeMap` keeps shard iteration deterministic, which in turn keeps
/// aggregation and display ordering stable across polls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Mapping from shard identifier to that shard's replicas.
    pub shards: BTreeMap<String, Vec<Node>>,
}

impl Cluster {
    /// Parse a topology payload from the control endpoint.
    ///
    /// Any shape violation (missing `shards` key, non-numeric `id` or
    /// `port`, ...) becomes [`FetchError::MalformedTopology`] so callers
    /// can tell a bad payload apart from a transport failure and keep
    /// their last-known-good snapshot.
    pub fn parse(payload: &[u8]) -> Result<Cluster, FetchError> {
        serde_json::from_slice(payload).map_err(FetchError::MalformedTopology)
    }

    /// Total number of nodes across all shards.
    pub fn node_count(&self) -> usize {
        self.shards.values().map(Vec::len).sum()
    }

    /// Iterate over every node in every shard.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.shards.values().flatten()
    }

    /// Whether the given shard's member list contains its own leader.
    ///
    /// A shard is leaderless when no member's `leader_id` resolves to a
    /// node inside the shard.  An unknown shard id counts as leaderless.
    pub fn shard_has_leader(&self, shard_id: &str) -> bool {
        match self.shards.get(shard_id) {
            Some(members) => Self::members_have_leader(members),
            None => false,
        }
    }

    /// Ids of shards whose member list lacks a resolvable leader.
    ///
    /// A leaderless shard is degraded; the aggregator surfaces this count
    /// rather than hiding it.
    pub fn leaderless_shards(&self) -> Vec<&str> {
        self.shards
            .iter()
            .filter(|(_, members)| !Self::members_have_leader(members))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    fn members_have_leader(members: &[Node]) -> bool {
        members
            .iter()
            .any(|m| members.iter().any(|n| n.id == m.leader_id))
    }
}

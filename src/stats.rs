//! Cluster-wide derived statistics.
//!
//! [`aggregate`] walks a topology snapshot and produces a fresh
//! [`ClusterStats`].  Stats hold no independent state: they are never
//! mutated in place, only replaced by the next aggregation pass, and a
//! failed fetch leaves the previous value untouched.

use serde::Serialize;

use crate::status::{normalize, CanonicalStatus};
use crate::topology::Cluster;

/// Counters derived from one cluster snapshot.
///
/// Field names serialize in the camelCase form the dashboard wire format
/// uses (`totalNodes`, `replicationFactor`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    /// All nodes across all shards.
    pub total_nodes: u32,
    /// Nodes whose status normalizes to Active.
    pub active_nodes: u32,
    /// Nodes whose status normalizes to Warning.
    pub warning_nodes: u32,
    /// Nodes whose status normalizes to Failed.
    pub failed_nodes: u32,
    /// Nodes with unrecognized status vocabulary.  Tracked even when not
    /// displayed so the four counters always sum to `total_nodes`.
    pub unknown_nodes: u32,
    /// Number of shard entries (not nodes).
    pub total_partitions: u32,
    /// Shards whose member list lacks a resolvable leader.
    pub leaderless_partitions: u32,
    /// Rounded mean of per-shard member counts; 0 with no shards.  The
    /// mean (rather than a configured constant) tolerates heterogeneous
    /// replication while a rebalance is in flight.
    pub replication_factor: u32,
    /// Storage utilization percentage, sourced out-of-band from the
    /// monitoring collaborator.  `aggregate` leaves this 0.
    pub storage_used_pct: u8,
    /// Network utilization percentage, sourced out-of-band.
    pub network_usage_pct: u8,
}

impl ClusterStats {
    /// Fill the out-of-band utilization slots, consuming self so the
    /// value stays replace-only.
    pub fn with_utilization(mut self, storage_used_pct: u8, network_usage_pct: u8) -> Self {
        self.storage_used_pct = storage_used_pct;
        self.network_usage_pct = network_usage_pct;
        self
    }
}

/// Compute cluster-wide statistics from a topology snapshot.
///
/// Pure and deterministic: the same snapshot always yields the same
/// stats, and nothing outside the returned value is touched.
pub fn aggregate(cluster: &Cluster) -> ClusterStats {
    let mut stats = ClusterStats::default();
    let mut replication_counts: Vec<usize> = Vec::with_capacity(cluster.shards.len());

    for members in cluster.shards.values() {
        replication_counts.push(members.len());
        for node in members {
            match normalize(&node.status) {
                CanonicalStatus::Active => stats.active_nodes += 1,
                CanonicalStatus::Warning => stats.warning_nodes += 1,
                CanonicalStatus::Failed => stats.failed_nodes += 1,
                CanonicalStatus::Unknown => stats.unknown_nodes += 1,
            }
        }
    }

    stats.total_partitions = cluster.shards.len() as u32;
    stats.leaderless_partitions = cluster.leaderless_shards().len() as u32;
    stats.total_nodes = replication_counts.iter().sum::<usize>() as u32;
    stats.replication_factor = if replication_counts.is_empty() {
        0
    } else {
        let mean = stats.total_nodes as f64 / replication_counts.len() as f64;
        mean.round() as u32
    };

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{Address, Node, NodeType};

    fn node(id: u64, shard_key: u64, leader_id: u64, status: &str) -> Node {
        Node {
            id,
            address: Address {
                ip: format!("10.0.0.{id}"),
                port: 7000,
            },
            node_type: NodeType::Unknown,
            shard_key,
            leader_id,
            status: status.to_string(),
        }
    }

    fn cluster(shards: Vec<(&str, Vec<Node>)>) -> Cluster {
        let mut c = Cluster::default();
        for (id, members) in shards {
            c.shards.insert(id.to_string(), members);
        }
        c
    }

    #[test]
    fn test_empty_cluster() {
        let stats = aggregate(&Cluster::default());
        assert_eq!(stats, ClusterStats::default());
        assert_eq!(stats.replication_factor, 0);
    }

    #[test]
    fn test_mixed_status_snapshot() {
        let c = cluster(vec![
            (
                "0",
                vec![node(1, 0, 1, "active"), node(2, 0, 1, "SYNCING")],
            ),
            ("1", vec![node(3, 1, 3, "failed")]),
        ]);
        let stats = aggregate(&c);
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.active_nodes, 1);
        assert_eq!(stats.warning_nodes, 1);
        assert_eq!(stats.failed_nodes, 1);
        assert_eq!(stats.unknown_nodes, 0);
        assert_eq!(stats.total_partitions, 2);
        // round((2 + 1) / 2) = 2
        assert_eq!(stats.replication_factor, 2);
    }

    #[test]
    fn test_counter_invariant_with_unknown_status() {
        let c = cluster(vec![
            (
                "0",
                vec![
                    node(1, 0, 1, "active"),
                    node(2, 0, 1, "rebooting"),
                    node(3, 0, 1, "UNREGISTERED"),
                ],
            ),
            ("1", vec![node(4, 1, 4, "down")]),
        ]);
        let stats = aggregate(&c);
        assert_eq!(stats.unknown_nodes, 2);
        assert_eq!(
            stats.active_nodes + stats.warning_nodes + stats.failed_nodes + stats.unknown_nodes,
            stats.total_nodes
        );
    }

    #[test]
    fn test_partition_count_independent_of_member_counts() {
        let c = cluster(vec![
            ("0", vec![node(1, 0, 1, "active")]),
            (
                "1",
                vec![
                    node(2, 1, 2, "active"),
                    node(3, 1, 2, "active"),
                    node(4, 1, 2, "active"),
                    node(5, 1, 2, "active"),
                ],
            ),
            ("2", vec![]),
        ]);
        let stats = aggregate(&c);
        assert_eq!(stats.total_partitions, 3);
        assert_eq!(stats.total_nodes, 5);
        // round((1 + 4 + 0) / 3) = round(1.67) = 2
        assert_eq!(stats.replication_factor, 2);
    }

    #[test]
    fn test_leaderless_shard_is_surfaced() {
        let c = cluster(vec![
            ("0", vec![node(1, 0, 1, "active"), node(2, 0, 1, "active")]),
            // Both members point at node 9, which is not in the shard.
            ("1", vec![node(3, 1, 9, "active"), node(4, 1, 9, "active")]),
        ]);
        let stats = aggregate(&c);
        assert_eq!(stats.leaderless_partitions, 1);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let c = cluster(vec![
            ("0", vec![node(1, 0, 1, "active"), node(2, 0, 1, "syncing")]),
            ("1", vec![node(3, 1, 3, "down")]),
        ]);
        assert_eq!(aggregate(&c), aggregate(&c));
    }

    #[test]
    fn test_utilization_slots() {
        let stats = aggregate(&Cluster::default()).with_utilization(42, 17);
        assert_eq!(stats.storage_used_pct, 42);
        assert_eq!(stats.network_usage_pct, 17);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ClusterStats::default()).unwrap();
        assert!(json.get("totalNodes").is_some());
        assert!(json.get("replicationFactor").is_some());
        assert!(json.get("storageUsedPct").is_some());
    }
}

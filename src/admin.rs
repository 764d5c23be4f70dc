//! Typed client for the cluster control endpoint.
//!
//! Covers the topology read plus the six administrative operations, JSON
//! over REST via `reqwest`.  Every 2xx response is a control-plane
//! acknowledgment that the operation was *accepted*, not that it has
//! completed: node removal, rebalance and leadership transfer converge
//! asynchronously and are observed through subsequent topology polls.
//!
//! The client is at-most-once: no automatic retries, no optimistic
//! mutation of any cached snapshot.  A non-2xx answer is mapped to the
//! per-operation [`AdminError`] variant, carrying the control plane's
//! own error message when one is present.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::errors::{AdminError, FetchError};
use crate::metrics;
use crate::topology::{Address, Cluster, NodeType};

// ── Request / response types ───────────────────────────────────────

/// Descriptor for a node joining the cluster.
#[derive(Debug, Clone, Serialize)]
pub struct AddNodeRequest {
    /// Network location of the new node.
    pub address: Address,
    /// Optional capacity hint for placement, in gigabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_gb: Option<u64>,
    /// Let the cluster assign the node to shard(s) immediately.
    pub auto_join: bool,
    /// Begin data migration onto the node once joined.
    pub rebalance: bool,
}

/// Acknowledgment of a node registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AddNodeResponse {
    /// Id assigned to the new node.
    pub id: u64,
    /// Shard the node was placed in.
    pub shard_key: u64,
    /// Initial status as reported by the control plane.
    pub status: String,
    /// Role assigned to the node.
    #[serde(default)]
    pub node_type: NodeType,
    /// Current leader of the node's shard.
    pub leader_id: u64,
    /// Address of that leader, when known.
    #[serde(default)]
    pub leader_address: Option<Address>,
}

/// Acknowledgment of a node removal.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveNodeResponse {
    /// Control-plane message describing what was scheduled.
    pub message: String,
}

/// Request to split/create partitions up to a target count.
///
/// Must not reduce any existing shard's replication factor; the control
/// plane enforces that and rejects otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct IncreasePartitionsRequest {
    /// Desired total partition count.
    pub partitions: u32,
}

/// Request to merge partitions down to a target count.
#[derive(Debug, Clone, Serialize)]
pub struct DecreasePartitionsRequest {
    /// Desired total partition count.
    pub partitions: u32,
}

/// Acknowledgment of a partition resize in either direction.
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionResizeResponse {
    /// Control-plane message describing what was scheduled.
    pub message: String,
    /// Partition count the cluster is converging toward.
    pub partitions: u32,
}

/// Request to transfer leadership within a shard.
#[derive(Debug, Clone, Serialize)]
pub struct ChangePartitionLeaderRequest {
    /// Member that should become leader.
    pub node_id: u64,
}

/// Acknowledgment of a leadership transfer request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePartitionLeaderResponse {
    /// Control-plane message.
    pub message: String,
    /// Shard the transfer applies to.
    pub shard_id: u64,
    /// Leader at the time the request was accepted.
    pub old_leader: u64,
    /// Leader the shard is converging toward.
    pub new_leader: u64,
}

/// Request to relocate a partition replica to another node.
#[derive(Debug, Clone, Serialize)]
pub struct MovePartitionRequest {
    /// Destination node for the replica.
    pub node_id: u64,
}

/// Acknowledgment of a replica relocation request.
#[derive(Debug, Clone, Deserialize)]
pub struct MovePartitionResponse {
    /// Control-plane message.
    pub message: String,
}

/// Error body shape the control plane uses on rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

/// HTTP client for the control endpoint.
///
/// Independent of the polling loop: admin commands never wait for or
/// block a poll, and their effects surface on later snapshots.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    /// Build a client for the control endpoint at `base_url`.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.controller.base_url.clone(),
            Duration::from_secs(config.poll.request_timeout_seconds),
        )
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extract status and the control plane's error message from a
    /// rejection.  Falls back to the raw body, then to the bare status.
    async fn failure_detail(resp: reqwest::Response) -> (u16, String) {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("control endpoint returned HTTP {status}")
                } else {
                    text
                }
            });
        (status, message)
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// `GET /health` -- existence check.  The payload is opaque to this
    /// core; success only means the endpoint is up.
    pub async fn check_health(&self) -> Result<(), FetchError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Http {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    /// `GET /admin/cluster` -- fetch the full topology snapshot.
    pub async fn fetch_cluster(&self) -> Result<Cluster, FetchError> {
        let resp = self.http.get(self.url("/admin/cluster")).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Http {
                status: resp.status().as_u16(),
            });
        }
        let body = resp.bytes().await?;
        Cluster::parse(&body)
    }

    // ── Admin operations ────────────────────────────────────────────

    /// `POST /admin/nodes` -- register a new node.
    pub async fn add_node(&self, req: &AddNodeRequest) -> Result<AddNodeResponse, AdminError> {
        let resp = self
            .http
            .post(self.url("/admin/nodes"))
            .json(req)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = Self::failure_detail(resp).await;
            metrics::record_admin_command("add_node", "rejected");
            return Err(AdminError::AddNodeFailed { status, message });
        }
        let out: AddNodeResponse = resp.json().await?;
        metrics::record_admin_command("add_node", "accepted");
        debug!(node_id = out.id, shard_key = out.shard_key, "add node accepted");
        Ok(out)
    }

    /// `DELETE /admin/nodes/{id}` -- mark a node for removal.  Data
    /// redistribution happens asynchronously in the cluster.
    pub async fn remove_node(&self, node_id: u64) -> Result<RemoveNodeResponse, AdminError> {
        let resp = self
            .http
            .delete(self.url(&format!("/admin/nodes/{node_id}")))
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = Self::failure_detail(resp).await;
            metrics::record_admin_command("remove_node", "rejected");
            return Err(AdminError::RemoveNodeFailed { status, message });
        }
        let out: RemoveNodeResponse = resp.json().await?;
        metrics::record_admin_command("remove_node", "accepted");
        debug!(node_id, "remove node accepted");
        Ok(out)
    }

    /// `POST /admin/partitions/increase` -- grow the partition count.
    pub async fn increase_partitions(
        &self,
        req: &IncreasePartitionsRequest,
    ) -> Result<PartitionResizeResponse, AdminError> {
        self.resize_partitions("/admin/partitions/increase", req).await
    }

    /// `POST /admin/partitions/decrease` -- shrink the partition count.
    pub async fn decrease_partitions(
        &self,
        req: &DecreasePartitionsRequest,
    ) -> Result<PartitionResizeResponse, AdminError> {
        self.resize_partitions("/admin/partitions/decrease", req).await
    }

    async fn resize_partitions<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<PartitionResizeResponse, AdminError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        if !resp.status().is_success() {
            let (status, message) = Self::failure_detail(resp).await;
            metrics::record_admin_command("resize_partitions", "rejected");
            return Err(AdminError::PartitionResizeFailed { status, message });
        }
        let out: PartitionResizeResponse = resp.json().await?;
        metrics::record_admin_command("resize_partitions", "accepted");
        debug!(partitions = out.partitions, "partition resize accepted");
        Ok(out)
    }

    /// `POST /admin/partitions/{id}/leader` -- request a leadership
    /// transfer within a shard.
    pub async fn change_partition_leader(
        &self,
        partition_id: &str,
        req: &ChangePartitionLeaderRequest,
    ) -> Result<ChangePartitionLeaderResponse, AdminError> {
        let resp = self
            .http
            .post(self.url(&format!("/admin/partitions/{partition_id}/leader")))
            .json(req)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = Self::failure_detail(resp).await;
            metrics::record_admin_command("change_partition_leader", "rejected");
            return Err(AdminError::LeaderChangeFailed { status, message });
        }
        let out: ChangePartitionLeaderResponse = resp.json().await?;
        metrics::record_admin_command("change_partition_leader", "accepted");
        debug!(
            shard_id = out.shard_id,
            old_leader = out.old_leader,
            new_leader = out.new_leader,
            "leader change accepted"
        );
        Ok(out)
    }

    /// `POST /admin/partitions/{id}/move` -- request relocation of a
    /// partition replica to another node.
    pub async fn move_partition(
        &self,
        partition_id: &str,
        req: &MovePartitionRequest,
    ) -> Result<MovePartitionResponse, AdminError> {
        let resp = self
            .http
            .post(self.url(&format!("/admin/partitions/{partition_id}/move")))
            .json(req)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = Self::failure_detail(resp).await;
            metrics::record_admin_command("move_partition", "rejected");
            return Err(AdminError::PartitionMoveFailed { status, message });
        }
        let out: MovePartitionResponse = resp.json().await?;
        metrics::record_admin_command("move_partition", "accepted");
        debug!(partition_id, "partition move accepted");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AdminClient::new("http://host:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://host:8080");
        assert_eq!(client.url("/health"), "http://host:8080/health");
    }

    #[test]
    fn test_add_node_request_serialization() {
        let req = AddNodeRequest {
            address: Address {
                ip: "10.0.0.9".into(),
                port: 7000,
            },
            capacity_gb: None,
            auto_join: true,
            rebalance: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["address"]["ip"], "10.0.0.9");
        assert_eq!(json["auto_join"], true);
        // Absent hint is omitted entirely, not sent as null.
        assert!(json.get("capacity_gb").is_none());
    }

    #[test]
    fn test_add_node_response_deserialization() {
        let body = r#"{
            "id": 4, "shard_key": 1, "status": "SYNCING",
            "node_type": "FOLLOWER", "leader_id": 3,
            "leader_address": {"ip": "10.0.0.3", "port": 7000}
        }"#;
        let resp: AddNodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.id, 4);
        assert_eq!(resp.node_type, NodeType::Follower);
        assert_eq!(resp.leader_address.unwrap().to_string(), "10.0.0.3:7000");
    }

    #[test]
    fn test_add_node_response_without_leader_address() {
        let body = r#"{"id": 4, "shard_key": 1, "status": "SYNCING", "leader_id": 3}"#;
        let resp: AddNodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.node_type, NodeType::Unknown);
        assert!(resp.leader_address.is_none());
    }
}

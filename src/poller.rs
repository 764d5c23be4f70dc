//! Polling / refresh controller.
//!
//! One loop owns the topology fetch, so at most one fetch is in flight
//! at any time.  Each successful poll replaces the snapshot wholesale
//! and recomputes stats synchronously; a failed poll flips the state to
//! [`PollState::StaleError`] and leaves the previous snapshot and stats
//! untouched (stale-but-available).  The next attempt runs at the same
//! fixed interval either way -- no backoff.
//!
//! Consumers read through a cheap clone-able [`PollerHandle`] and may
//! force an immediate refresh; a forced refresh while a fetch is already
//! in flight is a no-op that waits for the in-flight result.  Fetch
//! errors never escape the loop.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::admin::AdminClient;
use crate::errors::FetchError;
use crate::metrics;
use crate::stats::{aggregate, ClusterStats};
use crate::topology::Cluster;

/// Controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No fetch issued yet.
    Idle,
    /// A fetch is in flight.  Previously fetched data stays visible.
    Fetching,
    /// Last fetch succeeded; snapshot and stats are current.
    Ready,
    /// Last fetch failed; snapshot and stats are the last `Ready` ones.
    StaleError,
}

/// What consumers see: the latest state, snapshot and derived stats.
#[derive(Debug, Clone)]
pub struct PollSnapshot {
    /// Controller state.
    pub state: PollState,
    /// Last successfully fetched topology, if any.
    pub cluster: Option<Cluster>,
    /// Stats derived from `cluster`; retained unchanged across failed
    /// fetches.
    pub stats: ClusterStats,
    /// Message from the most recent failed fetch, cleared on success.
    pub last_error: Option<String>,
}

impl Default for PollSnapshot {
    fn default() -> Self {
        Self {
            state: PollState::Idle,
            cluster: None,
            stats: ClusterStats::default(),
            last_error: None,
        }
    }
}

struct Shared {
    snapshot: RwLock<PollSnapshot>,
    refresh: Notify,
}

/// Read/refresh handle shared with consumers.
#[derive(Clone)]
pub struct PollerHandle {
    shared: Arc<Shared>,
}

impl PollerHandle {
    /// Current snapshot (cloned out of the lock).
    pub fn snapshot(&self) -> PollSnapshot {
        self.shared
            .snapshot
            .read()
            .expect("poller snapshot lock poisoned")
            .clone()
    }

    /// Current controller state.
    pub fn state(&self) -> PollState {
        self.shared
            .snapshot
            .read()
            .expect("poller snapshot lock poisoned")
            .state
    }

    /// Latest derived stats.
    pub fn stats(&self) -> ClusterStats {
        self.shared
            .snapshot
            .read()
            .expect("poller snapshot lock poisoned")
            .stats
    }

    /// Force an immediate fetch.
    ///
    /// No-op while a fetch is already in flight: the in-flight result
    /// covers this request, and a second concurrent fetch must never
    /// start.
    pub fn refresh(&self) {
        if self.state() == PollState::Fetching {
            debug!("refresh requested while fetching, ignoring");
            return;
        }
        self.shared.refresh.notify_one();
    }
}

/// The fetch loop.  Construct with [`Poller::new`], then drive
/// [`Poller::run`] on a task; drop the task at page teardown to abandon
/// any in-flight fetch without side effects (shared state is only
/// written after a fully parsed snapshot).
pub struct Poller {
    client: AdminClient,
    interval: Duration,
    shared: Arc<Shared>,
}

impl Poller {
    /// Create a poller and its consumer handle.
    pub fn new(client: AdminClient, interval: Duration) -> (Poller, PollerHandle) {
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(PollSnapshot::default()),
            refresh: Notify::new(),
        });
        let handle = PollerHandle {
            shared: Arc::clone(&shared),
        };
        (
            Poller {
                client,
                interval,
                shared,
            },
            handle,
        )
    }

    /// Run the poll loop forever: fetch, publish, wait for the interval
    /// timer or a forced refresh, repeat.
    pub async fn run(self) {
        loop {
            self.poll_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shared.refresh.notified() => {
                    debug!("manual refresh requested");
                }
            }
        }
    }

    /// One fetch/publish cycle.
    async fn poll_once(&self) {
        self.set_state(PollState::Fetching);

        match self.client.fetch_cluster().await {
            Ok(cluster) => self.publish_ready(cluster),
            Err(err) => self.publish_stale(err),
        }
    }

    fn set_state(&self, state: PollState) {
        let mut snap = self
            .shared
            .snapshot
            .write()
            .expect("poller snapshot lock poisoned");
        snap.state = state;
    }

    fn publish_ready(&self, cluster: Cluster) {
        let stats = aggregate(&cluster);
        metrics::record_poll("ok");
        info!(
            total_nodes = stats.total_nodes,
            active_nodes = stats.active_nodes,
            warning_nodes = stats.warning_nodes,
            failed_nodes = stats.failed_nodes,
            unknown_nodes = stats.unknown_nodes,
            total_partitions = stats.total_partitions,
            leaderless_partitions = stats.leaderless_partitions,
            replication_factor = stats.replication_factor,
            "cluster snapshot refreshed"
        );

        let mut snap = self
            .shared
            .snapshot
            .write()
            .expect("poller snapshot lock poisoned");
        snap.state = PollState::Ready;
        snap.cluster = Some(cluster);
        snap.stats = stats;
        snap.last_error = None;
    }

    fn publish_stale(&self, err: FetchError) {
        // Shape violations and transport failures retry on the same
        // interval but must stay distinguishable in logs.
        if err.is_malformed() {
            metrics::record_poll("malformed");
            warn!(error = %err, "topology payload malformed, keeping last snapshot");
        } else {
            metrics::record_poll(match err {
                FetchError::Http { .. } => "http",
                _ => "transport",
            });
            warn!(error = %err, "topology fetch failed, keeping last snapshot");
        }

        let mut snap = self
            .shared
            .snapshot
            .write()
            .expect("poller snapshot lock poisoned");
        snap.state = PollState::StaleError;
        snap.last_error = Some(err.to_string());
        // snapshot and stats intentionally untouched.
    }
}

//! Best-effort replication status snapshots.
//!
//! The reporter reads counters owned by the replication loop and the
//! persisted local cursor, optionally adds a live probe of the source, and
//! never fails its caller: a broken probe degrades to zero-value fields.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::Result;

/// Binlog file/offset coordinate in a source's change-event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinlogPosition {
    pub name: String,
    pub pos: u64,
}

impl BinlogPosition {
    pub fn new(name: impl Into<String>, pos: u64) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.name.is_empty() && self.pos == 0
    }
}

impl fmt::Display for BinlogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return Ok(());
        }
        write!(f, "{}:{}", self.name, self.pos)
    }
}

/// Event counters owned by the replication loop and shared read-only into
/// the reporter. The rate gauges are maintained by the loop's ticker.
#[derive(Debug, Default)]
pub struct EventCounters {
    total: AtomicU64,
    total_tps: AtomicU64,
    recent_tps: AtomicU64,
}

impl EventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_events(&self, n: u64) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn set_rates(&self, total_tps: u64, recent_tps: u64) {
        self.total_tps.store(total_tps, Ordering::Relaxed);
        self.recent_tps.store(recent_tps, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn total_tps(&self) -> u64 {
        self.total_tps.load(Ordering::Relaxed)
    }

    pub fn recent_tps(&self) -> u64 {
        self.recent_tps.load(Ordering::Relaxed)
    }
}

/// Local replication cursor: last applied binlog position and GTID set,
/// owned by the persisted-position store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationCursor {
    pub position: BinlogPosition,
    pub gtid_set: String,
}

/// Source-side coordinates from one live `SHOW MASTER STATUS` round trip.
///
/// A successful probe is fresh only for that round trip, nothing longer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterStatus {
    pub position: BinlogPosition,
    pub gtid_set: String,
}

/// Live probe of the source's current position and GTID set. Timeout and
/// retry policy belong to the implementation; the reporter adds none of its
/// own.
pub trait MasterStatusProbe {
    fn master_status(&self) -> Result<MasterStatus>;
}

/// Point-in-time replication status snapshot. Wire encoding is the
/// monitoring layer's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub total_events: u64,
    pub total_tps: u64,
    pub recent_tps: u64,
    pub master_binlog: String,
    pub master_binlog_gtid: String,
    pub syncer_binlog: String,
    pub syncer_binlog_gtid: String,
}

/// Assembles status snapshots.
///
/// Constructed with the outcome of the replication-client privilege check:
/// when the privilege is absent the master probe is never attempted and the
/// master fields stay at their zero values.
pub struct StatusReporter {
    has_repl_client_privilege: bool,
}

impl StatusReporter {
    pub fn new(has_repl_client_privilege: bool) -> Self {
        Self {
            has_repl_client_privilege,
        }
    }

    /// Builds a snapshot from the loop's counters, the local cursor and,
    /// privilege permitting, a live master probe. Probe failures are logged
    /// and swallowed; assembly never fails.
    pub fn report(
        &self,
        counters: &EventCounters,
        cursor: &ReplicationCursor,
        probe: &dyn MasterStatusProbe,
    ) -> SyncStatus {
        let mut master = MasterStatus::default();
        if self.has_repl_client_privilege {
            match probe.master_status() {
                Ok(status) => master = status,
                Err(err) => warn!(error = %err, "master status probe failed"),
            }
        }

        SyncStatus {
            total_events: counters.total(),
            total_tps: counters.total_tps(),
            recent_tps: counters.recent_tps(),
            master_binlog: master.position.to_string(),
            master_binlog_gtid: master.gtid_set,
            syncer_binlog: cursor.position.to_string(),
            syncer_binlog_gtid: cursor.gtid_set.clone(),
        }
    }
}

//! Session Types
//!
//! Pure data: lifecycle states and the per-cycle scan report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::evidence::CollectorIssue;
use crate::logic::report::RiskDistribution;
use crate::logic::threat::{EngineVariant, Verdict};

// ============================================================================
// STATE
// ============================================================================

/// Idle -> Scanning -> Idle, Idle -> Exporting -> Idle, any -> Terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    Idle,
    Scanning,
    Exporting,
    Terminated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "IDLE",
            SessionState::Scanning => "SCANNING",
            SessionState::Exporting => "EXPORTING",
            SessionState::Terminated => "TERMINATED",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCAN REPORT
// ============================================================================

/// Outcome of one scan cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub engine: EngineVariant,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub verdicts: Vec<Verdict>,
    /// True when any collector could not be fully queried
    pub partial: bool,
    pub issues: Vec<CollectorIssue>,
    pub dropped_races: Vec<u32>,
    /// PIDs whose keyboard hook appeared since the previous cycle
    pub hooks_added: Vec<u32>,
    /// PIDs whose keyboard hook disappeared since the previous cycle
    pub hooks_removed: Vec<u32>,
}

impl ScanReport {
    pub fn detections(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.is_detection())
    }

    pub fn distribution(&self) -> RiskDistribution {
        RiskDistribution::from_verdicts(&self.verdicts)
    }

    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}

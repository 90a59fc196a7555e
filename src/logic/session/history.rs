//! Detection History
//!
//! Append-only verdict log owned by the session. Each scan cycle commits its
//! whole batch in one call, so readers never see half a cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::threat::{RiskTier, Verdict};

// ============================================================================
// FILTER
// ============================================================================

/// Conjunction of optional predicates; the default matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub min_tier: Option<RiskTier>,
    pub tiers: Option<Vec<RiskTier>>,
    /// Inclusive
    pub since: Option<DateTime<Utc>>,
    /// Inclusive
    pub until: Option<DateTime<Utc>>,
    pub process_id: Option<u32>,
    pub scan_id: Option<Uuid>,
    pub detections_only: bool,
}

impl HistoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn min_tier(mut self, tier: RiskTier) -> Self {
        self.min_tier = Some(tier);
        self
    }

    pub fn tiers(mut self, tiers: &[RiskTier]) -> Self {
        self.tiers = Some(tiers.to_vec());
        self
    }

    pub fn between(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    pub fn process(mut self, pid: u32) -> Self {
        self.process_id = Some(pid);
        self
    }

    pub fn scan(mut self, scan_id: Uuid) -> Self {
        self.scan_id = Some(scan_id);
        self
    }

    pub fn detections(mut self) -> Self {
        self.detections_only = true;
        self
    }

    pub fn matches(&self, v: &Verdict) -> bool {
        if self.detections_only && !v.is_detection() {
            return false;
        }
        if let Some(min) = self.min_tier {
            if v.risk_tier < min {
                return false;
            }
        }
        if let Some(tiers) = &self.tiers {
            if !tiers.contains(&v.risk_tier) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if v.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if v.timestamp > until {
                return false;
            }
        }
        if let Some(pid) = self.process_id {
            if v.process_id != pid {
                return false;
            }
        }
        if let Some(scan_id) = self.scan_id {
            if v.scan_id != Some(scan_id) {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// HISTORY
// ============================================================================

#[derive(Debug, Default)]
pub struct DetectionHistory {
    verdicts: Vec<Verdict>,
}

impl DetectionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit one cycle's verdicts
    pub fn append_batch(&mut self, batch: Vec<Verdict>) {
        self.verdicts.extend(batch);
    }

    pub fn query(&self, filter: &HistoryFilter) -> Vec<Verdict> {
        self.verdicts.iter().filter(|v| filter.matches(v)).cloned().collect()
    }

    pub fn all(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Returns the number of verdicts removed
    pub fn clear(&mut self) -> usize {
        let n = self.verdicts.len();
        self.verdicts.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn verdict(pid: u32, tier: RiskTier, at: DateTime<Utc>, scan: Option<Uuid>) -> Verdict {
        Verdict {
            scan_id: scan,
            process_id: pid,
            process_name: format!("p{}.exe", pid),
            binary_path: String::new(),
            risk_tier: tier,
            threat_score: 0,
            reasons: vec![],
            timestamp: at,
        }
    }

    fn history() -> (DetectionHistory, DateTime<Utc>, Uuid) {
        let t0 = Utc::now();
        let scan = Uuid::new_v4();
        let mut h = DetectionHistory::new();
        h.append_batch(vec![
            verdict(1, RiskTier::Clean, t0, None),
            verdict(2, RiskTier::Low, t0 + Duration::seconds(1), None),
            verdict(3, RiskTier::Medium, t0 + Duration::seconds(2), Some(scan)),
            verdict(4, RiskTier::High, t0 + Duration::seconds(3), Some(scan)),
        ]);
        (h, t0, scan)
    }

    fn pids(vs: Vec<Verdict>) -> Vec<u32> {
        vs.iter().map(|v| v.process_id).collect()
    }

    #[test]
    fn test_tier_filters() {
        let (h, _, _) = history();
        assert_eq!(pids(h.query(&HistoryFilter::all())), vec![1, 2, 3, 4]);
        assert_eq!(pids(h.query(&HistoryFilter::all().min_tier(RiskTier::Medium))), vec![3, 4]);
        assert_eq!(pids(h.query(&HistoryFilter::all().tiers(&[RiskTier::Clean, RiskTier::High]))), vec![1, 4]);
        assert_eq!(pids(h.query(&HistoryFilter::all().detections())), vec![4]);
    }

    #[test]
    fn test_time_range_inclusive() {
        let (h, t0, _) = history();
        let filter = HistoryFilter::all().between(
            Some(t0 + Duration::seconds(1)),
            Some(t0 + Duration::seconds(2)),
        );
        assert_eq!(pids(h.query(&filter)), vec![2, 3]);
    }

    #[test]
    fn test_process_and_scan_filters() {
        let (h, _, scan) = history();
        assert_eq!(pids(h.query(&HistoryFilter::all().scan(scan))), vec![3, 4]);
        assert_eq!(pids(h.query(&HistoryFilter::all().process(2))), vec![2]);
        assert!(h.query(&HistoryFilter::all().process(2).scan(scan)).is_empty());
    }

    #[test]
    fn test_clear() {
        let (mut h, _, _) = history();
        assert_eq!(h.clear(), 4);
        assert!(h.is_empty());
    }
}

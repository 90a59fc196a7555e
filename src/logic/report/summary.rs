//! Summary Report
//!
//! Aggregate view over a verdict set (history or one scan).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exporter::{create_file, host_name, timestamped_path};
use crate::logic::error::{DetectorError, Result};
use crate::logic::threat::{Indicator, RiskTier, Verdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub clean: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut dist = Self::default();
        for v in verdicts {
            dist.add(v.risk_tier);
        }
        dist
    }

    pub fn add(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Clean => self.clean += 1,
            RiskTier::Low => self.low += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::High => self.high += 1,
        }
    }

    pub fn get(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Clean => self.clean,
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.clean + self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighRiskProcess {
    pub process_id: u32,
    pub process_name: String,
    pub binary_path: String,
    pub threat_score: u32,
    pub reasons: Vec<Indicator>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub report_type: String,
    pub generated_at: DateTime<Utc>,
    pub host: String,
    pub total_verdicts: usize,
    /// Distinct (name, path) pairs; PIDs are reused across cycles
    pub unique_processes: usize,
    pub scan_cycles: usize,
    pub risk_distribution: RiskDistribution,
    /// Latest HIGH verdict per process
    pub high_risk_processes: Vec<HighRiskProcess>,
}

impl SummaryReport {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let unique_processes: HashSet<(&str, &str)> = verdicts
            .iter()
            .map(|v| (v.process_name.as_str(), v.binary_path.as_str()))
            .collect();
        let scan_cycles: HashSet<_> = verdicts.iter().filter_map(|v| v.scan_id).collect();

        let mut high_risk_processes: Vec<HighRiskProcess> = Vec::new();
        for v in verdicts.iter().filter(|v| v.is_detection()) {
            let entry = HighRiskProcess {
                process_id: v.process_id,
                process_name: v.process_name.clone(),
                binary_path: v.binary_path.clone(),
                threat_score: v.threat_score,
                reasons: v.reasons.clone(),
                last_seen: v.timestamp,
            };
            match high_risk_processes
                .iter_mut()
                .find(|p| p.process_id == v.process_id && p.process_name == v.process_name)
            {
                Some(existing) if existing.last_seen <= v.timestamp => *existing = entry,
                Some(_) => {}
                None => high_risk_processes.push(entry),
            }
        }

        Self {
            report_type: "summary".to_string(),
            generated_at: Utc::now(),
            host: host_name(),
            total_verdicts: verdicts.len(),
            unique_processes: unique_processes.len(),
            scan_cycles: scan_cycles.len(),
            risk_distribution: RiskDistribution::from_verdicts(verdicts),
            high_risk_processes,
        }
    }

    /// Write as `<dir>/summary_YYYYmmdd_HHMMSS.json`
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = timestamped_path(dir, "summary", "json");
        let file = create_file(&path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)
            .map_err(|e| DetectorError::ExportFailure(e.to_string()))?;
        log::info!("Summary report written to {}", path.display());
        Ok(path)
    }
}

//! Threat Types
//!
//! Core types for verdicts and engine selection.
//! No logic here - only data structures.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::error::DetectorError;

// ============================================================================
// RISK TIER
// ============================================================================

/// Bucketed severity. Ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Clean,
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [RiskTier::Clean, RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Clean => "CLEAN",
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "CLEAN" => Some(RiskTier::Clean),
            "LOW" => Some(RiskTier::Low),
            "MEDIUM" => Some(RiskTier::Medium),
            "HIGH" => Some(RiskTier::High),
            _ => None,
        }
    }

    /// Only HIGH is surfaced as a detection
    pub fn is_actionable(&self) -> bool {
        matches!(self, RiskTier::High)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// INDICATORS
// ============================================================================

/// Tags appended to a verdict's reasons, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    NameSpoofing,
    KeyloggerKeyword,
    UnsignedBinary,
    SuspiciousLocation,
    UnknownPublisherNonstandardPath,
    HiddenWindow,
    // legacy engine only
    UnusualPath,
    OrphanProcess,
    TempLocation,
    UnknownService,
    MultipleHooks,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameSpoofing => "name_spoofing",
            Self::KeyloggerKeyword => "keylogger_keyword",
            Self::UnsignedBinary => "unsigned_binary",
            Self::SuspiciousLocation => "suspicious_location",
            Self::UnknownPublisherNonstandardPath => "unknown_publisher_nonstandard_path",
            Self::HiddenWindow => "hidden_window",
            Self::UnusualPath => "unusual_path",
            Self::OrphanProcess => "orphan_process",
            Self::TempLocation => "temp_location",
            Self::UnknownService => "unknown_service",
            Self::MultipleHooks => "multiple_hooks",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "name_spoofing" => Some(Self::NameSpoofing),
            "keylogger_keyword" => Some(Self::KeyloggerKeyword),
            "unsigned_binary" => Some(Self::UnsignedBinary),
            "suspicious_location" => Some(Self::SuspiciousLocation),
            "unknown_publisher_nonstandard_path" => Some(Self::UnknownPublisherNonstandardPath),
            "hidden_window" => Some(Self::HiddenWindow),
            "unusual_path" => Some(Self::UnusualPath),
            "orphan_process" => Some(Self::OrphanProcess),
            "temp_location" => Some(Self::TempLocation),
            "unknown_service" => Some(Self::UnknownService),
            "multiple_hooks" => Some(Self::MultipleHooks),
            _ => None,
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Per-process classification output for one scan cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Set by the session when the verdict joins a scan cycle
    pub scan_id: Option<Uuid>,
    pub process_id: u32,
    pub process_name: String,
    pub binary_path: String,
    pub risk_tier: RiskTier,
    pub threat_score: u32,
    pub reasons: Vec<Indicator>,
    pub timestamp: DateTime<Utc>,
}

impl Verdict {
    pub fn is_detection(&self) -> bool {
        self.risk_tier.is_actionable()
    }

    pub fn in_scan(mut self, scan_id: Uuid) -> Self {
        self.scan_id = Some(scan_id);
        self
    }

    pub fn reason_tags(&self) -> Vec<&'static str> {
        self.reasons.iter().map(|r| r.as_str()).collect()
    }
}

/// One row of an engine's rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub indicator: Indicator,
    pub name: &'static str,
    pub description: &'static str,
    pub weight: u32,
}

// ============================================================================
// ENGINE SELECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineVariant {
    #[default]
    Tiered,
    Legacy,
}

impl EngineVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineVariant::Tiered => "tiered",
            EngineVariant::Legacy => "legacy",
        }
    }
}

impl FromStr for EngineVariant {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered" => Ok(EngineVariant::Tiered),
            "legacy" => Ok(EngineVariant::Legacy),
            other => Err(DetectorError::config(format!("unknown engine '{}'", other))),
        }
    }
}

impl std::fmt::Display for EngineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weight scaling for the legacy engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }

    /// x1.3 (high) / x0.7 (low), truncated
    pub fn scale(&self, weight: u32) -> u32 {
        match self {
            Sensitivity::Low => weight * 7 / 10,
            Sensitivity::Medium => weight,
            Sensitivity::High => weight * 13 / 10,
        }
    }
}

impl FromStr for Sensitivity {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(DetectorError::config(format!("unknown sensitivity '{}'", other))),
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

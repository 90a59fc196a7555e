//! Scoring Rules & Thresholds
//!
//! Weights and tier tables for both engines.
//! No classify logic here - only constants and the tables built from them.

use super::types::{Indicator, RiskTier, RuleInfo, Sensitivity};

// ============================================================================
// TIERED ENGINE WEIGHTS
// ============================================================================

pub const NAME_SPOOFING_WEIGHT: u32 = 2;
pub const KEYWORD_WEIGHT: u32 = 2;
pub const UNSIGNED_WEIGHT: u32 = 1;
pub const SUSPICIOUS_LOCATION_WEIGHT: u32 = 1;
pub const UNKNOWN_PUBLISHER_WEIGHT: u32 = 1;
pub const HIDDEN_WINDOW_WEIGHT: u32 = 1;

// ============================================================================
// TIERED ENGINE THRESHOLDS
// ============================================================================

/// At or above this score = HIGH (the alert threshold)
pub const HIGH_THRESHOLD: u32 = 3;
pub const MEDIUM_THRESHOLD: u32 = 2;
pub const LOW_THRESHOLD: u32 = 1;

pub fn tier_for_score(score: u32) -> RiskTier {
    if score >= HIGH_THRESHOLD {
        RiskTier::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskTier::Medium
    } else if score >= LOW_THRESHOLD {
        RiskTier::Low
    } else {
        RiskTier::Clean
    }
}

pub fn tiered_rules() -> Vec<RuleInfo> {
    vec![
        RuleInfo {
            id: "T001",
            indicator: Indicator::NameSpoofing,
            name: "Name Spoofing",
            description: "Reserved system name outside every trusted prefix",
            weight: NAME_SPOOFING_WEIGHT,
        },
        RuleInfo {
            id: "T002",
            indicator: Indicator::KeyloggerKeyword,
            name: "Keylogger Keyword",
            description: "Name or path contains a keystroke-capture term",
            weight: KEYWORD_WEIGHT,
        },
        RuleInfo {
            id: "T003",
            indicator: Indicator::UnsignedBinary,
            name: "Unsigned Binary",
            description: "Signature confirmed absent (unknown does not count)",
            weight: UNSIGNED_WEIGHT,
        },
        RuleInfo {
            id: "T004",
            indicator: Indicator::SuspiciousLocation,
            name: "Suspicious Location",
            description: "Path matches a temp/download pattern",
            weight: SUSPICIOUS_LOCATION_WEIGHT,
        },
        RuleInfo {
            id: "T005",
            indicator: Indicator::UnknownPublisherNonstandardPath,
            name: "Unknown Publisher, Non-standard Path",
            description: "No publisher and path outside every trusted prefix",
            weight: UNKNOWN_PUBLISHER_WEIGHT,
        },
        RuleInfo {
            id: "T006",
            indicator: Indicator::HiddenWindow,
            name: "Hidden Window",
            description: "Hook owner has no visible window",
            weight: HIDDEN_WINDOW_WEIGHT,
        },
    ]
}

// ============================================================================
// LEGACY ENGINE
// ============================================================================

pub const LEGACY_UNSIGNED_WEIGHT: u32 = 25;
pub const LEGACY_HIDDEN_WINDOW_WEIGHT: u32 = 20;
pub const LEGACY_UNUSUAL_PATH_WEIGHT: u32 = 30;
pub const LEGACY_ORPHAN_PROCESS_WEIGHT: u32 = 10;
pub const LEGACY_TEMP_LOCATION_WEIGHT: u32 = 20;
pub const LEGACY_NAME_SPOOFING_WEIGHT: u32 = 35;
pub const LEGACY_UNKNOWN_SERVICE_WEIGHT: u32 = 15;
pub const LEGACY_KEYWORD_WEIGHT: u32 = 25;
pub const LEGACY_MULTIPLE_HOOKS_WEIGHT: u32 = 20;

/// More hooks than this from one process fires `multiple_hooks`
pub const LEGACY_MULTIPLE_HOOKS_MIN: u32 = 2;

/// Path fragments counted as temp execution (normalized form)
pub const LEGACY_TEMP_MARKERS: &[&str] = &[r"\temp\", r"\tmp\", r"\appdata\local\temp"];

pub const LEGACY_HIGH_THRESHOLD: u32 = 61;
pub const LEGACY_MEDIUM_THRESHOLD: u32 = 31;

pub fn legacy_tier_for_score(score: u32) -> RiskTier {
    if score >= LEGACY_HIGH_THRESHOLD {
        RiskTier::High
    } else if score >= LEGACY_MEDIUM_THRESHOLD {
        RiskTier::Medium
    } else if score > 0 {
        RiskTier::Low
    } else {
        RiskTier::Clean
    }
}

pub fn legacy_rules(sensitivity: Sensitivity) -> Vec<RuleInfo> {
    let rule = |id, indicator, name, description, weight: u32| RuleInfo {
        id,
        indicator,
        name,
        description,
        weight: sensitivity.scale(weight),
    };

    vec![
        rule(
            "R001",
            Indicator::UnsignedBinary,
            "Unsigned Binary",
            "Executable lacks valid digital signature",
            LEGACY_UNSIGNED_WEIGHT,
        ),
        rule(
            "R002",
            Indicator::HiddenWindow,
            "Hidden Window",
            "Non-service process has no visible windows",
            LEGACY_HIDDEN_WINDOW_WEIGHT,
        ),
        rule(
            "R003",
            Indicator::UnusualPath,
            "Unusual Path",
            "Suspicious directory outside trusted install locations",
            LEGACY_UNUSUAL_PATH_WEIGHT,
        ),
        rule(
            "R006",
            Indicator::OrphanProcess,
            "Orphan Process",
            "Parent process no longer exists",
            LEGACY_ORPHAN_PROCESS_WEIGHT,
        ),
        rule(
            "R007",
            Indicator::TempLocation,
            "Temp Directory Execution",
            "Executable running from a temporary directory",
            LEGACY_TEMP_LOCATION_WEIGHT,
        ),
        rule(
            "R008",
            Indicator::NameSpoofing,
            "Name Spoofing",
            "Process name mimics a system process but path differs",
            LEGACY_NAME_SPOOFING_WEIGHT,
        ),
        rule(
            "R009",
            Indicator::UnknownService,
            "Unknown Service",
            "Service process with a confirmed missing signature",
            LEGACY_UNKNOWN_SERVICE_WEIGHT,
        ),
        rule(
            "R010",
            Indicator::MultipleHooks,
            "Multiple Hooks",
            "Process registered more than two keyboard hooks",
            LEGACY_MULTIPLE_HOOKS_WEIGHT,
        ),
        rule(
            "R011",
            Indicator::KeyloggerKeyword,
            "Keylogger Keyword",
            "Name or path contains a keystroke-capture term",
            LEGACY_KEYWORD_WEIGHT,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for_score(0), RiskTier::Clean);
        assert_eq!(tier_for_score(1), RiskTier::Low);
        assert_eq!(tier_for_score(2), RiskTier::Medium);
        assert_eq!(tier_for_score(3), RiskTier::High);
        assert_eq!(tier_for_score(9), RiskTier::High);
    }

    #[test]
    fn test_legacy_tier_boundaries() {
        assert_eq!(legacy_tier_for_score(0), RiskTier::Clean);
        assert_eq!(legacy_tier_for_score(30), RiskTier::Low);
        assert_eq!(legacy_tier_for_score(31), RiskTier::Medium);
        assert_eq!(legacy_tier_for_score(60), RiskTier::Medium);
        assert_eq!(legacy_tier_for_score(61), RiskTier::High);
    }

    #[test]
    fn test_no_single_tiered_rule_alerts() {
        for rule in tiered_rules() {
            assert!(tier_for_score(rule.weight) < RiskTier::High, "{} alone alerts", rule.name);
        }
    }

    #[test]
    fn test_sensitivity_scaling() {
        let high: Vec<u32> = legacy_rules(Sensitivity::High).iter().map(|r| r.weight).collect();
        let low: Vec<u32> = legacy_rules(Sensitivity::Low).iter().map(|r| r.weight).collect();
        assert_eq!(high, vec![32, 26, 39, 13, 26, 45, 19, 26, 32]);
        assert_eq!(low, vec![17, 14, 21, 7, 14, 24, 10, 14, 17]);
    }
}

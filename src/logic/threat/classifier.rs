//! Tiered Classifier
//!
//! Only classify logic - no types, no policy data.
//! Input: EvidenceRecord + TrustStore
//! Output: Verdict
//!
//! Tier 1 whitelist, tier 2 weighted indicators, tier 3 threshold mapping.

use super::engine::ScoringEngine;
use super::rules::{
    self, tier_for_score, HIDDEN_WINDOW_WEIGHT, KEYWORD_WEIGHT, NAME_SPOOFING_WEIGHT,
    SUSPICIOUS_LOCATION_WEIGHT, UNKNOWN_PUBLISHER_WEIGHT, UNSIGNED_WEIGHT,
};
use super::types::{EngineVariant, Indicator, RiskTier, RuleInfo, Verdict};
use super::whitelist::is_whitelisted;
use crate::logic::evidence::EvidenceRecord;
use crate::logic::trust::TrustStore;

// ============================================================================
// MAIN CLASSIFICATION FUNCTION
// ============================================================================

/// Classify one record with the tiered engine.
///
/// Pure: the verdict timestamp is the record's `observed_at`, so the same
/// record always yields the same verdict.
pub fn classify(evidence: &EvidenceRecord, trust: &TrustStore) -> Verdict {
    if !evidence.has_keyboard_hook || is_whitelisted(evidence, trust) {
        return verdict_for(evidence, RiskTier::Clean, 0, Vec::new());
    }

    let fired = evaluate_indicators(evidence, trust);
    let threat_score: u32 = fired.iter().map(|(_, weight)| weight).sum();
    let reasons: Vec<Indicator> = fired.into_iter().map(|(indicator, _)| indicator).collect();

    log::debug!(
        "PID {} ({}) score {}: {:?}",
        evidence.process_id,
        evidence.binary_name,
        threat_score,
        reasons
    );

    verdict_for(evidence, tier_for_score(threat_score), threat_score, reasons)
}

/// Tier 2 indicators that fire for this record, with their weights
pub fn evaluate_indicators(evidence: &EvidenceRecord, trust: &TrustStore) -> Vec<(Indicator, u32)> {
    let mut fired = Vec::new();
    let trusted_path = trust.is_trusted_path(&evidence.binary_path);

    if evidence.matches_known_system_name && !trusted_path {
        fired.push((Indicator::NameSpoofing, NAME_SPOOFING_WEIGHT));
    }

    if !trust
        .matched_keywords(&evidence.binary_name, &evidence.binary_path)
        .is_empty()
    {
        fired.push((Indicator::KeyloggerKeyword, KEYWORD_WEIGHT));
    }

    if evidence.is_signed.is_confirmed_unsigned() {
        fired.push((Indicator::UnsignedBinary, UNSIGNED_WEIGHT));
    }

    if trust.is_suspicious_path(&evidence.binary_path) {
        fired.push((Indicator::SuspiciousLocation, SUSPICIOUS_LOCATION_WEIGHT));
    }

    if evidence.publisher.name().is_none() && !trusted_path {
        fired.push((Indicator::UnknownPublisherNonstandardPath, UNKNOWN_PUBLISHER_WEIGHT));
    }

    if evidence.window_hidden {
        fired.push((Indicator::HiddenWindow, HIDDEN_WINDOW_WEIGHT));
    }

    fired
}

pub(crate) fn verdict_for(
    evidence: &EvidenceRecord,
    risk_tier: RiskTier,
    threat_score: u32,
    reasons: Vec<Indicator>,
) -> Verdict {
    Verdict {
        scan_id: None,
        process_id: evidence.process_id,
        process_name: evidence.binary_name.clone(),
        binary_path: evidence.binary_path.clone(),
        risk_tier,
        threat_score,
        reasons,
        timestamp: evidence.observed_at,
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Three-tier engine with small per-indicator weights
#[derive(Debug, Clone, Copy, Default)]
pub struct TieredEngine;

impl ScoringEngine for TieredEngine {
    fn classify(&self, evidence: &EvidenceRecord, trust: &TrustStore) -> Verdict {
        classify(evidence, trust)
    }

    fn variant(&self) -> EngineVariant {
        EngineVariant::Tiered
    }

    fn rules(&self) -> Vec<RuleInfo> {
        rules::tiered_rules()
    }
}

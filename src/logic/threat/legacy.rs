//! Legacy Heuristic Engine
//!
//! Alternate weighted-rule engine on a 0-100+ scale. Shares the tier 1
//! whitelist and the "unknown signature is not unsigned" rule with the
//! tiered engine; only one of the two is active per deployment.

use super::classifier::verdict_for;
use super::engine::ScoringEngine;
use super::rules::{
    self, legacy_tier_for_score, LEGACY_HIDDEN_WINDOW_WEIGHT, LEGACY_KEYWORD_WEIGHT,
    LEGACY_MULTIPLE_HOOKS_MIN, LEGACY_MULTIPLE_HOOKS_WEIGHT, LEGACY_NAME_SPOOFING_WEIGHT,
    LEGACY_ORPHAN_PROCESS_WEIGHT, LEGACY_TEMP_LOCATION_WEIGHT, LEGACY_TEMP_MARKERS,
    LEGACY_UNKNOWN_SERVICE_WEIGHT, LEGACY_UNSIGNED_WEIGHT, LEGACY_UNUSUAL_PATH_WEIGHT,
};
use super::types::{EngineVariant, Indicator, RiskTier, RuleInfo, Sensitivity, Verdict};
use super::whitelist::is_whitelisted;
use crate::logic::evidence::EvidenceRecord;
use crate::logic::trust::{normalize_path, TrustStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyHeuristicEngine {
    sensitivity: Sensitivity,
}

impl LegacyHeuristicEngine {
    pub fn new(sensitivity: Sensitivity) -> Self {
        Self { sensitivity }
    }

    fn evaluate(&self, evidence: &EvidenceRecord, trust: &TrustStore) -> Vec<(Indicator, u32)> {
        let scale = |w| self.sensitivity.scale(w);
        let mut fired = Vec::new();
        let path = normalize_path(&evidence.binary_path);
        let trusted_path = trust.is_trusted_path(&path);

        if evidence.is_signed.is_confirmed_unsigned() {
            fired.push((Indicator::UnsignedBinary, scale(LEGACY_UNSIGNED_WEIGHT)));
        }

        // services never own a visible window
        if evidence.window_hidden && !evidence.is_service {
            fired.push((Indicator::HiddenWindow, scale(LEGACY_HIDDEN_WINDOW_WEIGHT)));
        }

        if !trusted_path && trust.is_suspicious_path(&path) {
            fired.push((Indicator::UnusualPath, scale(LEGACY_UNUSUAL_PATH_WEIGHT)));
        }

        if evidence.parent_exited {
            fired.push((Indicator::OrphanProcess, scale(LEGACY_ORPHAN_PROCESS_WEIGHT)));
        }

        if LEGACY_TEMP_MARKERS.iter().any(|marker| path.contains(marker)) {
            fired.push((Indicator::TempLocation, scale(LEGACY_TEMP_LOCATION_WEIGHT)));
        }

        if evidence.matches_known_system_name && !trusted_path {
            fired.push((Indicator::NameSpoofing, scale(LEGACY_NAME_SPOOFING_WEIGHT)));
        }

        if evidence.is_service && evidence.is_signed.is_confirmed_unsigned() {
            fired.push((Indicator::UnknownService, scale(LEGACY_UNKNOWN_SERVICE_WEIGHT)));
        }

        if evidence.hook_count > LEGACY_MULTIPLE_HOOKS_MIN {
            fired.push((Indicator::MultipleHooks, scale(LEGACY_MULTIPLE_HOOKS_WEIGHT)));
        }

        if !trust.matched_keywords(&evidence.binary_name, &path).is_empty() {
            fired.push((Indicator::KeyloggerKeyword, scale(LEGACY_KEYWORD_WEIGHT)));
        }

        fired
    }
}

impl ScoringEngine for LegacyHeuristicEngine {
    fn classify(&self, evidence: &EvidenceRecord, trust: &TrustStore) -> Verdict {
        if !evidence.has_keyboard_hook || is_whitelisted(evidence, trust) {
            return verdict_for(evidence, RiskTier::Clean, 0, Vec::new());
        }

        let fired = self.evaluate(evidence, trust);
        let score: u32 = fired.iter().map(|(_, w)| w).sum();
        let reasons = fired.into_iter().map(|(i, _)| i).collect();

        verdict_for(evidence, legacy_tier_for_score(score), score, reasons)
    }

    fn variant(&self) -> EngineVariant {
        EngineVariant::Legacy
    }

    fn rules(&self) -> Vec<RuleInfo> {
        rules::legacy_rules(self.sensitivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evidence::{Publisher, SignatureState};

    fn trust() -> TrustStore {
        TrustStore::builtin().unwrap()
    }

    #[test]
    fn test_temp_dropper_scores_high() {
        // unsigned 25 + hidden 20 + unusual path 30 + temp 20 = 95
        let record = EvidenceRecord::hooked(4120, "badproc.exe", r"C:\Temp\badproc.exe")
            .with_signature(SignatureState::Unsigned)
            .with_publisher(Publisher::Absent)
            .with_hidden_window(true);

        let verdict = LegacyHeuristicEngine::default().classify(&record, &trust());
        assert_eq!(verdict.threat_score, 95);
        assert_eq!(verdict.risk_tier, RiskTier::High);
        assert_eq!(
            verdict.reasons,
            vec![
                Indicator::UnsignedBinary,
                Indicator::HiddenWindow,
                Indicator::UnusualPath,
                Indicator::TempLocation
            ]
        );
    }

    #[test]
    fn test_unknown_signature_not_counted() {
        let record = EvidenceRecord::hooked(1, "tool.exe", r"C:\Tools\tool.exe")
            .with_signature(SignatureState::Unknown);
        let verdict = LegacyHeuristicEngine::default().classify(&record, &trust());
        assert_eq!(verdict.threat_score, 0);
        assert_eq!(verdict.risk_tier, RiskTier::Clean);
    }

    #[test]
    fn test_multiple_hooks_and_sensitivity() {
        let record = EvidenceRecord::hooked(1, "tool.exe", r"C:\Tools\tool.exe").with_hook_count(3);

        let medium = LegacyHeuristicEngine::new(Sensitivity::Medium).classify(&record, &trust());
        assert_eq!(medium.threat_score, 20);
        assert_eq!(medium.risk_tier, RiskTier::Low);

        let high = LegacyHeuristicEngine::new(Sensitivity::High).classify(&record, &trust());
        assert_eq!(high.threat_score, 26);
    }

    #[test]
    fn test_orphan_and_unsigned_service() {
        // unsigned 25 + orphan 10 + unknown service 15; hidden window exempt for services
        let record = EvidenceRecord::hooked(880, "svcagent.exe", r"C:\Services\svcagent.exe")
            .with_signature(SignatureState::Unsigned)
            .with_hidden_window(true)
            .with_parent_exited(true)
            .with_service(true);

        let verdict = LegacyHeuristicEngine::default().classify(&record, &trust());
        assert_eq!(verdict.threat_score, 50);
        assert_eq!(verdict.risk_tier, RiskTier::Medium);
        assert_eq!(
            verdict.reasons,
            vec![
                Indicator::UnsignedBinary,
                Indicator::OrphanProcess,
                Indicator::UnknownService
            ]
        );
    }

    #[test]
    fn test_service_with_unknown_signature_not_flagged() {
        let record = EvidenceRecord::hooked(881, "svcagent.exe", r"C:\Services\svcagent.exe")
            .with_signature(SignatureState::Unknown)
            .with_hidden_window(true)
            .with_service(true);

        let verdict = LegacyHeuristicEngine::default().classify(&record, &trust());
        assert_eq!(verdict.threat_score, 0);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_whitelist_shared_with_tiered() {
        let record = EvidenceRecord::hooked(7300, "setpoint.exe", r"C:\Program Files\Logitech\setpoint.exe")
            .with_signature(SignatureState::Unsigned)
            .with_publisher(Publisher::Named("Logitech".into()))
            .with_hidden_window(true)
            .with_hook_count(5);
        let verdict = LegacyHeuristicEngine::new(Sensitivity::High).classify(&record, &trust());
        assert_eq!(verdict.risk_tier, RiskTier::Clean);
        assert!(verdict.reasons.is_empty());
    }
}

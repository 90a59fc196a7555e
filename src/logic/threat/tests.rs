//! Scoring engine behaviour tests

use super::*;
use crate::logic::evidence::{EvidenceRecord, Publisher, SignatureState};
use crate::logic::trust::TrustStore;

fn trust() -> TrustStore {
    TrustStore::builtin().unwrap()
}

fn engines() -> Vec<Box<dyn ScoringEngine>> {
    vec![
        build_engine(EngineVariant::Tiered, Sensitivity::Medium),
        build_engine(EngineVariant::Legacy, Sensitivity::Low),
        build_engine(EngineVariant::Legacy, Sensitivity::High),
    ]
}

const SIGNATURES: [SignatureState; 3] =
    [SignatureState::Signed, SignatureState::Unsigned, SignatureState::Unknown];

fn publishers() -> Vec<Publisher> {
    vec![
        Publisher::Absent,
        Publisher::Unknown,
        Publisher::Named("Totally Legit Software".into()),
    ]
}

// ============================================================================
// TIER 1
// ============================================================================

#[test]
fn test_known_safe_name_always_clean() {
    let trust = trust();
    let paths = [
        r"C:\Users\a\AppData\Local\Temp\keylogger\chrome.exe",
        r"C:\Users\Public\chrome.exe",
        "",
    ];

    for engine in engines() {
        for path in paths {
            for sig in SIGNATURES {
                for publisher in publishers() {
                    for flags in 0..4u8 {
                        let record = EvidenceRecord::hooked(1, "CHROME.EXE", path)
                            .with_signature(sig)
                            .with_publisher(publisher.clone())
                            .with_hidden_window(flags & 1 != 0)
                            .with_system_name(flags & 2 != 0)
                            .with_hook_count(7);
                        let verdict = engine.classify(&record, &trust);
                        assert_eq!(verdict.risk_tier, RiskTier::Clean, "{:?}", record);
                        assert!(verdict.reasons.is_empty());
                        assert_eq!(verdict.threat_score, 0);
                    }
                }
            }
        }
    }
}

#[test]
fn test_trusted_publisher_and_path_always_clean() {
    let trust = trust();
    let paths = [
        r"C:\Program Files\Logitech\keylog_helper.exe",
        r"c:/program files (x86)/Logitech/svchost.exe",
        r"C:\Windows\System32\Temp\hook_keys.exe",
    ];

    for engine in engines() {
        for path in paths {
            for sig in SIGNATURES {
                for flags in 0..4u8 {
                    let record = EvidenceRecord::hooked(2, "svchost.exe", path)
                        .with_signature(sig)
                        .with_publisher(Publisher::Named("LOGITECH, INC.".into()))
                        .with_hidden_window(flags & 1 != 0)
                        .with_system_name(flags & 2 != 0);
                    let verdict = engine.classify(&record, &trust);
                    assert_eq!(verdict.risk_tier, RiskTier::Clean, "{}", path);
                    assert!(verdict.reasons.is_empty());
                }
            }
        }
    }
}

// ============================================================================
// TIER 2 / TIER 3
// ============================================================================

/// One untrusted record per combination of the six indicator facts
fn indicator_record(mask: u8) -> EvidenceRecord {
    let spoof = mask & 1 != 0;
    let keyword = mask & 2 != 0;
    let unsigned = mask & 4 != 0;
    let suspicious = mask & 8 != 0;
    let no_publisher = mask & 16 != 0;
    let hidden = mask & 32 != 0;

    let name = if spoof { "svchost.exe" } else { "helper.exe" };
    let path = format!(
        r"{}{}{}",
        if suspicious { r"c:\users\a\downloads\" } else { r"c:\tools\" },
        if keyword { r"keylog\" } else { "" },
        name
    );

    EvidenceRecord::hooked(100 + mask as u32, name, &path)
        .with_system_name(spoof)
        .with_signature(if unsigned { SignatureState::Unsigned } else { SignatureState::Signed })
        .with_publisher(if no_publisher {
            Publisher::Absent
        } else {
            Publisher::Named("Acme Input".into())
        })
        .with_hidden_window(hidden)
}

const MASK_WEIGHTS: [u32; 6] = [2, 2, 1, 1, 1, 1];

#[test]
fn test_each_fact_fires_exactly_its_indicator() {
    let trust = trust();
    for mask in 0..64u8 {
        let verdict = classify(&indicator_record(mask), &trust);
        let expected: u32 = (0..6).filter(|b| mask & (1 << b) != 0).map(|b| MASK_WEIGHTS[b]).sum();
        assert_eq!(verdict.threat_score, expected, "mask {:06b}", mask);
        assert_eq!(verdict.reasons.len(), mask.count_ones() as usize);
        assert_eq!(verdict.risk_tier, tier_for_score(expected));
    }
}

#[test]
fn test_score_monotonic_in_indicators() {
    let trust = trust();
    for engine in engines() {
        let scores: Vec<u32> = (0..64u8)
            .map(|m| engine.classify(&indicator_record(m), &trust).threat_score)
            .collect();

        for mask in 0..64usize {
            for bit in 0..6 {
                let with = mask | (1 << bit);
                assert!(scores[with] >= scores[mask], "{:?} {:06b} + bit {}", engine.variant(), mask, bit);
            }
        }
    }
}

#[test]
fn test_reasons_present_iff_not_clean() {
    let trust = trust();
    for engine in engines() {
        for mask in 0..64u8 {
            let verdict = engine.classify(&indicator_record(mask), &trust);
            assert_eq!(verdict.reasons.is_empty(), verdict.risk_tier == RiskTier::Clean);
        }
    }
}

#[test]
fn test_boundary_two_and_three() {
    let trust = trust();

    let spoof_only = indicator_record(1);
    let verdict = classify(&spoof_only, &trust);
    assert_eq!((verdict.threat_score, verdict.risk_tier), (2, RiskTier::Medium));

    let spoof_hidden = indicator_record(1 | 32);
    let verdict = classify(&spoof_hidden, &trust);
    assert_eq!((verdict.threat_score, verdict.risk_tier), (3, RiskTier::High));
    assert!(verdict.is_detection());
}

#[test]
fn test_no_single_indicator_alerts() {
    let trust = trust();
    for bit in 0..6 {
        let verdict = classify(&indicator_record(1 << bit), &trust);
        assert!(verdict.risk_tier < RiskTier::High);
    }
}

#[test]
fn test_unknown_signature_does_not_fire() {
    let trust = trust();
    let unsigned = indicator_record(4);
    let unknown = unsigned.clone().with_signature(SignatureState::Unknown);

    assert_eq!(classify(&unsigned, &trust).reasons, vec![Indicator::UnsignedBinary]);
    assert!(classify(&unknown, &trust).reasons.is_empty());
}

#[test]
fn test_unknown_publisher_inside_trusted_path() {
    let trust = trust();
    let record = EvidenceRecord::hooked(5, "driverhelper.exe", r"C:\Program Files\Vendor\driverhelper.exe")
        .with_signature(SignatureState::Signed)
        .with_publisher(Publisher::Unknown);
    assert_eq!(classify(&record, &trust).risk_tier, RiskTier::Clean);

    let moved = record.clone();
    let moved = EvidenceRecord { binary_path: r"C:\Vendor\driverhelper.exe".into(), ..moved };
    assert_eq!(classify(&moved, &trust).reasons, vec![Indicator::UnknownPublisherNonstandardPath]);
}

#[test]
fn test_idempotent() {
    let trust = trust();
    for engine in engines() {
        for mask in [0u8, 7, 45, 63] {
            let record = indicator_record(mask);
            assert_eq!(engine.classify(&record, &trust), engine.classify(&record, &trust));
        }
    }
}

#[test]
fn test_record_without_hook_is_clean() {
    let trust = trust();
    let mut record = indicator_record(63);
    record.has_keyboard_hook = false;
    assert_eq!(classify(&record, &trust).risk_tier, RiskTier::Clean);
}

#[test]
fn test_empty_fields_never_panic() {
    let trust = trust();
    let record = EvidenceRecord::hooked(0, "", "");
    for engine in engines() {
        let verdict = engine.classify(&record, &trust);
        assert!(verdict.threat_score <= 1);
    }
}

// ============================================================================
// WORKED EXAMPLES
// ============================================================================

#[test]
fn test_example_explorer_in_windows_dir() {
    let trust = trust();
    for publisher in [Publisher::Named("Microsoft Corporation".into()), Publisher::Absent] {
        let record = EvidenceRecord::hooked(2248, "explorer.exe", r"C:\Windows\explorer.exe")
            .with_signature(SignatureState::Signed)
            .with_publisher(publisher)
            .with_system_name(true);
        let verdict = classify(&record, &trust);
        assert_eq!(verdict.risk_tier, RiskTier::Clean);
        assert!(verdict.reasons.is_empty());
    }
}

#[test]
fn test_example_explorer_in_temp() {
    let trust = trust();
    let record = EvidenceRecord::hooked(6100, "explorer.exe", r"C:\Users\a\AppData\Local\Temp\explorer.exe")
        .with_signature(SignatureState::Unsigned)
        .with_publisher(Publisher::Named("Microsoft Corporation".into()))
        .with_system_name(true);

    let verdict = classify(&record, &trust);
    assert_eq!(verdict.threat_score, 4);
    assert_eq!(verdict.risk_tier, RiskTier::High);
    assert_eq!(
        verdict.reasons,
        vec![Indicator::NameSpoofing, Indicator::UnsignedBinary, Indicator::SuspiciousLocation]
    );
}

#[test]
fn test_example_logitech_setpoint() {
    let trust = trust();
    let record = EvidenceRecord::hooked(7300, "setpoint.exe", r"C:\Program Files\Logitech\setpoint.exe")
        .with_publisher(Publisher::Named("Logitech".into()));

    let verdict = classify(&record, &trust);
    assert_eq!(verdict.risk_tier, RiskTier::Clean);
    assert!(verdict.reasons.is_empty());
}

#[test]
fn test_example_hidden_unsigned_in_downloads() {
    let trust = trust();
    let record = EvidenceRecord::hooked(9001, "helper.exe", r"C:\Users\a\Downloads\helper.exe")
        .with_signature(SignatureState::Unsigned)
        .with_publisher(Publisher::Absent)
        .with_hidden_window(true);

    let verdict = classify(&record, &trust);
    assert_eq!(verdict.threat_score, 4);
    assert_eq!(verdict.risk_tier, RiskTier::High);
    assert_eq!(
        verdict.reasons,
        vec![
            Indicator::UnsignedBinary,
            Indicator::SuspiciousLocation,
            Indicator::UnknownPublisherNonstandardPath,
            Indicator::HiddenWindow,
        ]
    );
}

// ============================================================================
// INJECTED STORES
// ============================================================================

#[test]
fn test_synthetic_store_changes_outcome() {
    let mut policy = crate::logic::trust::TrustPolicy::empty();
    policy.trusted_publishers.push("Acme Input".into());
    policy.trusted_path_prefixes.push(r"c:\tools".into());
    let store = TrustStore::from_policy(&policy).unwrap();

    // trusted in the synthetic store, untrusted in the built-in one
    let record = indicator_record(4 | 32);
    assert_eq!(classify(&record, &store).risk_tier, RiskTier::Clean);
    assert_eq!(classify(&record, &trust()).threat_score, 2);
}

//! Tier 1 - Whitelist short-circuit
//!
//! Runs before any indicator so trusted software never collects partial score.

use crate::logic::evidence::EvidenceRecord;
use crate::logic::trust::TrustStore;

/// Known-safe name, or trusted publisher installed under a trusted prefix
pub fn is_whitelisted(evidence: &EvidenceRecord, trust: &TrustStore) -> bool {
    if trust.is_known_safe(&evidence.binary_name) {
        return true;
    }

    match evidence.publisher.name() {
        Some(publisher) => {
            trust.is_trusted_publisher(publisher) && trust.is_trusted_path(&evidence.binary_path)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evidence::Publisher;

    #[test]
    fn test_known_safe_name() {
        let trust = TrustStore::builtin().unwrap();
        let record = EvidenceRecord::hooked(1, "Chrome.exe", r"c:\users\a\downloads\chrome.exe");
        assert!(is_whitelisted(&record, &trust));
    }

    #[test]
    fn test_publisher_needs_trusted_path() {
        let trust = TrustStore::builtin().unwrap();
        let installed = EvidenceRecord::hooked(1, "setpoint.exe", r"C:\Program Files\Logitech\setpoint.exe")
            .with_publisher(Publisher::Named("Logitech Inc.".into()));
        assert!(is_whitelisted(&installed, &trust));

        let dropped = EvidenceRecord::hooked(1, "setpoint.exe", r"C:\Users\a\Downloads\setpoint.exe")
            .with_publisher(Publisher::Named("Logitech Inc.".into()));
        assert!(!is_whitelisted(&dropped, &trust));
    }

    #[test]
    fn test_absent_publisher_never_whitelists() {
        let trust = TrustStore::builtin().unwrap();
        let record = EvidenceRecord::hooked(1, "tool.exe", r"C:\Program Files\Tool\tool.exe")
            .with_publisher(Publisher::Absent);
        assert!(!is_whitelisted(&record, &trust));
    }
}

//! Evidence Collector
//!
//! Turns collaborator output into one `EvidenceRecord` per hooked process.
//! Non-keyboard hooks are dropped here, so nothing without a keyboard hook
//! ever reaches the scoring engine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::sources::EvidenceSources;
use super::types::{CollectorIssue, EvidenceRecord, HookEntry, ProcessDetails, SignatureInfo};
use crate::logic::error::DetectorError;
use crate::logic::trust::TrustStore;

/// Everything one collection pass produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionOutcome {
    pub records: Vec<EvidenceRecord>,
    pub issues: Vec<CollectorIssue>,
    /// PIDs that exited between enumeration and lookup
    pub dropped_races: Vec<u32>,
    /// Every PID seen holding a keyboard hook, including race losses
    pub hooked_pids: Vec<u32>,
}

impl CollectionOutcome {
    pub fn is_partial(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Keyboard hooks merged per PID, first-seen order kept
pub fn keyboard_hook_counts(entries: &[HookEntry]) -> Vec<(u32, u32)> {
    let mut order: Vec<(u32, u32)> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for entry in entries.iter().filter(|e| e.hook_type.is_keyboard()) {
        match index.get(&entry.pid) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(entry.pid, order.len());
                order.push((entry.pid, 1));
            }
        }
    }

    order
}

/// Run one collection pass. Never fails: degradation is recorded on the outcome.
pub fn collect(
    sources: &EvidenceSources,
    trust: &TrustStore,
    observed_at: DateTime<Utc>,
) -> CollectionOutcome {
    let mut outcome = CollectionOutcome::default();

    let snapshot = sources.hooks.enumerate();
    if let Some(reason) = &snapshot.denied {
        log::warn!("Hook enumeration incomplete ({}): {}", sources.hooks.name(), reason);
        outcome.issues.push(CollectorIssue {
            source: sources.hooks.name().to_string(),
            pid: None,
            detail: reason.clone(),
        });
    }

    for (pid, hook_count) in keyboard_hook_counts(&snapshot.entries) {
        outcome.hooked_pids.push(pid);

        let details = match sources.processes.lookup(pid) {
            Ok(Some(details)) => Some(details),
            Ok(None) => {
                log::debug!("{}", DetectorError::RaceLoss { pid });
                outcome.dropped_races.push(pid);
                continue;
            }
            Err(e) => {
                log::warn!("Process lookup failed for PID {}: {}", pid, e);
                outcome.issues.push(CollectorIssue::from_error(Some(pid), &e));
                None
            }
        };

        let details = details.unwrap_or_else(|| ProcessDetails {
            binary_name: String::new(),
            binary_path: String::new(),
            window_hidden: false,
            parent_exited: false,
            is_service: false,
        });
        let binary_path = details.binary_path;

        let signature = if binary_path.trim().is_empty() {
            SignatureInfo::unknown()
        } else {
            match sources.signatures.lookup(&binary_path) {
                Ok(info) => info,
                Err(e) => {
                    log::warn!("Signature lookup failed for PID {}: {}", pid, e);
                    outcome.issues.push(CollectorIssue::from_error(Some(pid), &e));
                    SignatureInfo::unknown()
                }
            }
        };

        let record = EvidenceRecord::hooked(pid, &details.binary_name, &binary_path)
            .with_signature(signature.state)
            .with_publisher(signature.publisher)
            .with_hidden_window(details.window_hidden)
            .with_parent_exited(details.parent_exited)
            .with_service(details.is_service)
            .with_hook_count(hook_count)
            .observed(observed_at);
        let matches_system = trust.is_system_binary_name(&record.binary_name);

        outcome.records.push(record.with_system_name(matches_system));
    }

    log::debug!(
        "Collected {} hooked records ({} races, {} issues)",
        outcome.records.len(),
        outcome.dropped_races.len(),
        outcome.issues.len()
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::evidence::mock::{MockProcess, MockSources};
    use crate::logic::evidence::types::{HookType, Publisher, SignatureState};
    use std::sync::Arc;

    fn trust() -> TrustStore {
        TrustStore::builtin().unwrap()
    }

    #[test]
    fn test_only_keyboard_hooks_produce_records() {
        let mock = Arc::new(MockSources::empty());
        mock.insert(MockProcess::new(10, "mouser.exe", r"c:\tools\mouser.exe").hooks(&[HookType::MouseLowLevel]));
        mock.insert(MockProcess::new(11, "idle.exe", r"c:\tools\idle.exe"));
        mock.insert(MockProcess::new(12, "keys.exe", r"c:\tools\keys.exe").hooks(&[HookType::KeyboardLowLevel]));

        let outcome = collect(&EvidenceSources::from_single(mock), &trust(), Utc::now());
        let pids: Vec<u32> = outcome.records.iter().map(|r| r.process_id).collect();
        assert_eq!(pids, vec![12]);
        assert!(outcome.records.iter().all(|r| r.has_keyboard_hook));
    }

    #[test]
    fn test_hooks_merged_per_pid() {
        let entries = vec![
            HookEntry { pid: 5, hook_type: HookType::KeyboardLowLevel },
            HookEntry { pid: 3, hook_type: HookType::Keyboard },
            HookEntry { pid: 5, hook_type: HookType::Keyboard },
            HookEntry { pid: 5, hook_type: HookType::Mouse },
        ];
        assert_eq!(keyboard_hook_counts(&entries), vec![(5, 2), (3, 1)]);
    }

    #[test]
    fn test_race_loss_dropped() {
        let mock = Arc::new(MockSources::empty());
        mock.insert(MockProcess::new(20, "gone.exe", r"c:\x\gone.exe").hooks(&[HookType::KeyboardLowLevel]));
        mock.mark_exited(20);

        let outcome = collect(&EvidenceSources::from_single(mock), &trust(), Utc::now());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.dropped_races, vec![20]);
        assert_eq!(outcome.hooked_pids, vec![20]);
        assert!(!outcome.is_partial());
    }

    #[test]
    fn test_denied_signature_is_unknown() {
        let mock = Arc::new(MockSources::empty());
        mock.insert(
            MockProcess::new(30, "tool.exe", r"c:\x\tool.exe")
                .signature(SignatureState::Unsigned)
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        mock.deny_signatures(true);

        let outcome = collect(&EvidenceSources::from_single(mock), &trust(), Utc::now());
        let record = &outcome.records[0];
        assert_eq!(record.is_signed, SignatureState::Unknown);
        assert_eq!(record.publisher, Publisher::Unknown);
        assert!(outcome.is_partial());
        assert_eq!(outcome.issues[0].pid, Some(30));
    }

    #[test]
    fn test_parent_and_service_flags_carried() {
        let mock = Arc::new(MockSources::empty());
        mock.insert(MockProcess::new(50, "orphan.exe", r"c:\x\orphan.exe").orphaned(true).hooks(&[HookType::Keyboard]));
        mock.insert(MockProcess::new(51, "svc.exe", r"c:\x\svc.exe").service(true).hooks(&[HookType::Keyboard]));

        let outcome = collect(&EvidenceSources::from_single(mock), &trust(), Utc::now());
        assert!(outcome.records[0].parent_exited);
        assert!(!outcome.records[0].is_service);
        assert!(outcome.records[1].is_service);
        assert!(!outcome.records[1].parent_exited);
    }

    #[test]
    fn test_system_name_flag_and_timestamp() {
        let mock = Arc::new(MockSources::empty());
        mock.insert(MockProcess::new(40, "Explorer.EXE", r"c:\temp\explorer.exe").hooks(&[HookType::Keyboard]));
        let at = Utc::now();

        let outcome = collect(&EvidenceSources::from_single(mock), &trust(), at);
        assert_eq!(outcome.records[0].binary_name, "explorer.exe");
        assert!(outcome.records[0].matches_known_system_name);
        assert_eq!(outcome.records[0].observed_at, at);
    }
}

//! Session State Machine
//!
//! Drives scan cycles, owns the detection history and serializes every
//! state-changing operation (scan, export, clear) through one operation lock.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::history::{DetectionHistory, HistoryFilter};
use super::monitor::{self, CycleObserver, MonitorHandle};
use super::types::{ScanReport, SessionState};
use crate::logic::error::{DetectorError, Result};
use crate::logic::evidence::{collect, EvidenceSources};
use crate::logic::report::{self, ExportFormat, SummaryReport};
use crate::logic::threat::{classify_batch, EngineVariant, RuleInfo, ScoringEngine, Verdict};
use crate::logic::trust::TrustStore;

/// State carried from one cycle to the next, guarded by the operation lock
#[derive(Debug, Default)]
struct CycleState {
    previous_hooks: Option<BTreeSet<u32>>,
    completed_cycles: u64,
}

pub struct Session {
    engine: Box<dyn ScoringEngine>,
    trust: Arc<TrustStore>,
    sources: EvidenceSources,
    state: RwLock<SessionState>,
    operation: Mutex<CycleState>,
    history: RwLock<DetectionHistory>,
    last_report: RwLock<Option<ScanReport>>,
    monitor: Mutex<Option<MonitorHandle>>,
}

impl Session {
    pub fn new(engine: Box<dyn ScoringEngine>, trust: Arc<TrustStore>, sources: EvidenceSources) -> Self {
        log::info!(
            "Session ready: engine={}, sources=[{}]",
            engine.variant(),
            sources.describe()
        );

        Self {
            engine,
            trust,
            sources,
            state: RwLock::new(SessionState::Idle),
            operation: Mutex::new(CycleState::default()),
            history: RwLock::new(DetectionHistory::new()),
            last_report: RwLock::new(None),
            monitor: Mutex::new(None),
        }
    }

    // ========================================================================
    // SCANNING
    // ========================================================================

    /// Run one scan cycle and commit its verdicts to history
    pub fn snapshot(&self) -> Result<ScanReport> {
        let mut cycle = self.operation.lock();
        self.ensure_live()?;

        self.set_state(SessionState::Scanning);
        let report = self.run_cycle(&mut cycle);

        // single atomic commit of the whole batch
        self.history.write().append_batch(report.verdicts.clone());
        *self.last_report.write() = Some(report.clone());
        self.set_state(SessionState::Idle);

        Ok(report)
    }

    fn run_cycle(&self, cycle: &mut CycleState) -> ScanReport {
        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();

        let outcome = collect(&self.sources, &self.trust, started_at);
        let verdicts: Vec<Verdict> = classify_batch(self.engine.as_ref(), &outcome.records, &self.trust)
            .into_iter()
            .map(|v| v.in_scan(scan_id))
            .collect();

        for v in verdicts.iter().filter(|v| v.is_detection()) {
            log::warn!(
                "[KEYLOGGER DETECTED] {} (PID {}) score {}: {}",
                v.process_name,
                v.process_id,
                v.threat_score,
                v.reason_tags().join(", ")
            );
        }

        let current: BTreeSet<u32> = outcome.hooked_pids.iter().copied().collect();
        let (hooks_added, hooks_removed) = match &cycle.previous_hooks {
            Some(previous) => (
                current.difference(previous).copied().collect(),
                previous.difference(&current).copied().collect(),
            ),
            None => (current.iter().copied().collect(), Vec::new()),
        };
        cycle.previous_hooks = Some(current);
        cycle.completed_cycles += 1;

        let partial = outcome.is_partial();
        let report = ScanReport {
            scan_id,
            engine: self.engine.variant(),
            started_at,
            completed_at: Utc::now(),
            verdicts,
            partial,
            issues: outcome.issues,
            dropped_races: outcome.dropped_races,
            hooks_added,
            hooks_removed,
        };

        let dist = report.distribution();
        log::info!(
            "Scan #{} complete: {} hooked ({} high, {} medium, {} low, {} clean) in {}ms",
            cycle.completed_cycles,
            report.verdicts.len(),
            dist.high,
            dist.medium,
            dist.low,
            dist.clean,
            report.duration_ms()
        );
        if partial {
            log::warn!(
                "Scan {} is partial: {} collector issue(s), run elevated for full coverage",
                scan_id,
                report.issues.len()
            );
        }

        report
    }

    // ========================================================================
    // MONITORING
    // ========================================================================

    /// Repeat scan cycles every `interval` on a dedicated thread
    pub fn start_monitoring(self: &Arc<Self>, interval: Duration) -> Result<()> {
        self.start_monitoring_with(interval, None)
    }

    /// Same as `start_monitoring`, calling `observer` after every cycle
    pub fn start_monitoring_with(
        self: &Arc<Self>,
        interval: Duration,
        observer: Option<CycleObserver>,
    ) -> Result<()> {
        self.ensure_live()?;
        if interval.is_zero() {
            return Err(DetectorError::config("monitor interval must be greater than zero"));
        }

        let mut slot = self.monitor.lock();
        if slot.as_ref().is_some_and(|m| m.is_running()) {
            return Err(DetectorError::MonitorAlreadyRunning);
        }

        *slot = Some(monitor::spawn(Arc::downgrade(self), interval, observer)?);
        Ok(())
    }

    /// Signal the monitor to stop after its current cycle and wait for it.
    /// From inside a cycle observer this only signals, since the caller is
    /// the monitor thread. Returns false when no monitor was running.
    pub fn stop_monitoring(&self) -> bool {
        let handle = self.monitor.lock().take();
        match handle {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.lock().as_ref().is_some_and(|m| m.is_running())
    }

    // ========================================================================
    // HISTORY & EXPORT
    // ========================================================================

    pub fn get_history(&self, filter: &HistoryFilter) -> Vec<Verdict> {
        self.history.read().query(filter)
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Export the full history. On failure the history is left intact.
    pub fn export<W: Write>(&self, format: ExportFormat, writer: W) -> Result<usize> {
        self.exporting(|verdicts| report::export_verdicts(verdicts, format, writer))
    }

    /// Export the full history to a timestamped file under `dir`.
    /// Returns the file and how many verdicts went into it.
    pub fn export_to_dir(&self, format: ExportFormat, dir: &Path) -> Result<(PathBuf, usize)> {
        self.exporting(|verdicts| report::export_to_dir(verdicts, format, dir))
    }

    /// Summary over the full history
    pub fn summary(&self) -> SummaryReport {
        SummaryReport::from_verdicts(self.history.read().all())
    }

    fn exporting<T>(&self, write: impl FnOnce(&[Verdict]) -> Result<T>) -> Result<T> {
        let _op = self.operation.lock();
        self.ensure_live()?;

        self.set_state(SessionState::Exporting);
        let verdicts = self.history.read().all().to_vec();
        let result = write(&verdicts);
        self.set_state(SessionState::Idle);

        if let Err(e) = &result {
            log::error!("Export failed, history kept ({} verdicts): {}", verdicts.len(), e);
        }
        result
    }

    /// Returns the number of verdicts removed
    pub fn clear_history(&self) -> Result<usize> {
        let _op = self.operation.lock();
        self.ensure_live()?;

        let removed = self.history.write().clear();
        log::info!("History cleared ({} verdicts)", removed);
        Ok(removed)
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Stop monitoring and move to TERMINATED. Idempotent.
    pub fn shutdown(&self) {
        self.stop_monitoring();

        let _op = self.operation.lock();
        if self.state() != SessionState::Terminated {
            self.set_state(SessionState::Terminated);
            log::info!("Session terminated");
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn last_report(&self) -> Option<ScanReport> {
        self.last_report.read().clone()
    }

    pub fn engine_variant(&self) -> EngineVariant {
        self.engine.variant()
    }

    pub fn rules(&self) -> Vec<RuleInfo> {
        self.engine.rules()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state() == SessionState::Terminated {
            return Err(DetectorError::SessionTerminated);
        }
        Ok(())
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        log::debug!("Session {} -> {}", *state, next);
        *state = next;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // may run on the monitor thread itself, so never join here
        if let Some(handle) = self.monitor.get_mut().take() {
            handle.signal();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine.variant())
            .field("sources", &self.sources)
            .field("state", &self.state())
            .field("history", &self.history_len())
            .finish()
    }
}

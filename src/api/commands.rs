//! Commands - API for the CLI front end
//!
//! Thin handlers over `logic`. Errors cross this boundary as `String`.

use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::constants;
use crate::logic::config::AppConfig;
use crate::logic::evidence::{
    AuthenticodeSignatureSource,
    EvidenceSources,
    HookSource,
    JsonHookSource,
    MockSources,
    SysinfoProcessSource,
    UnavailableHookSource,
};
use crate::logic::report::{exporter, ExportFormat};
use crate::logic::session::{CycleObserver, HistoryFilter, ScanReport, Session};
use crate::logic::threat::{build_engine, RuleInfo, Verdict};
use crate::logic::trust::TrustSummary;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Effective configuration, as shown by `keyguard policy`
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatus {
    pub app: String,
    pub version: String,
    pub engine: String,
    pub sensitivity: String,
    pub monitor_interval_secs: f64,
    pub trust_store: String,
    pub trust_summary: TrustSummary,
    pub sources: String,
    pub export_dir: String,
}

/// Files written by an export
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub verdicts_file: PathBuf,
    pub summary_file: Option<PathBuf>,
    pub verdict_count: usize,
}

// ============================================================================
// SESSION SETUP
// ============================================================================

/// Wire collaborators: the demo host for `--mock`, otherwise live sources
pub fn build_sources(config: &AppConfig, mock: bool) -> EvidenceSources {
    if mock {
        log::info!("Using mock evidence sources (demo host)");
        return EvidenceSources::from_single(Arc::new(MockSources::demo()));
    }

    let hooks: Arc<dyn HookSource> = match &config.hooks_file {
        Some(path) => Arc::new(JsonHookSource::new(path)),
        None => {
            log::warn!("No hook enumerator configured (--hooks-file); scans will be partial");
            Arc::new(UnavailableHookSource::new("no hook enumerator configured"))
        }
    };

    EvidenceSources::new(
        hooks,
        Arc::new(AuthenticodeSignatureSource::new()),
        Arc::new(SysinfoProcessSource::new()),
    )
}

/// Load the trust store, pick the engine, and create a session
pub fn open_session(config: &AppConfig, mock: bool) -> Result<Arc<Session>, String> {
    let trust = config.trust_store().map_err(|e| e.to_string())?;
    log::info!("Trust store: {}", trust.summary());

    let engine = build_engine(config.engine, config.sensitivity);
    let sources = build_sources(config, mock);

    Ok(Arc::new(Session::new(engine, trust, sources)))
}

// ============================================================================
// SCAN COMMANDS
// ============================================================================

/// One scan cycle
pub fn run_snapshot(session: &Session) -> Result<ScanReport, String> {
    session.snapshot().map_err(|e| e.to_string())
}

/// Start the monitoring loop; `observer` runs after each cycle
pub fn start_monitor(
    session: &Arc<Session>,
    interval: Duration,
    observer: Option<CycleObserver>,
) -> Result<bool, String> {
    session
        .start_monitoring_with(interval, observer)
        .map_err(|e| e.to_string())?;
    Ok(true)
}

/// Stop monitoring. Returns false if it was not running.
pub fn stop_monitor(session: &Session) -> Result<bool, String> {
    Ok(session.stop_monitoring())
}

pub fn get_history(session: &Session, filter: &HistoryFilter) -> Result<Vec<Verdict>, String> {
    Ok(session.get_history(filter))
}

// ============================================================================
// EXPORT COMMANDS
// ============================================================================

/// Export history to `output`, or to a timestamped file under `export_dir`
pub fn export_history(
    session: &Session,
    format: ExportFormat,
    output: Option<&Path>,
    export_dir: &Path,
) -> Result<ExportResult, String> {
    let (verdicts_file, verdict_count) = match output {
        Some(path) => {
            let file = exporter::create_file(path).map_err(|e| e.to_string())?;
            let count = session
                .export(format, BufWriter::new(file))
                .map_err(|e| e.to_string())?;
            log::info!("Exported {} verdicts to {}", count, path.display());
            (path.to_path_buf(), count)
        }
        None => session
            .export_to_dir(format, export_dir)
            .map_err(|e| e.to_string())?,
    };

    Ok(ExportResult {
        verdicts_file,
        summary_file: None,
        verdict_count,
    })
}

/// Verdicts plus a JSON summary, both under `export_dir`
pub fn export_with_summary(
    session: &Session,
    format: ExportFormat,
    export_dir: &Path,
) -> Result<ExportResult, String> {
    let mut result = export_history(session, format, None, export_dir)?;
    let summary = session.summary();
    result.summary_file = Some(summary.export_to_dir(export_dir).map_err(|e| e.to_string())?);
    Ok(result)
}

// ============================================================================
// INFO COMMANDS
// ============================================================================

/// Rule table of the active engine
pub fn get_rules(session: &Session) -> Result<Vec<RuleInfo>, String> {
    Ok(session.rules())
}

pub fn get_policy(config: &AppConfig, mock: bool) -> Result<PolicyStatus, String> {
    let trust = config.trust_store().map_err(|e| e.to_string())?;
    let sources = build_sources(config, mock);

    Ok(PolicyStatus {
        app: constants::APP_NAME.to_string(),
        version: constants::APP_VERSION.to_string(),
        engine: config.engine.to_string(),
        sensitivity: config.sensitivity.to_string(),
        monitor_interval_secs: config.monitor_interval_secs,
        trust_store: config
            .trust_store_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        trust_summary: trust.summary(),
        sources: sources.describe(),
        export_dir: config.export_dir.display().to_string(),
    })
}

// ============================================================================
// RENDERING
// ============================================================================

/// Plain-text verdict table for one cycle
pub fn render_report(report: &ScanReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Scan {} ({} engine) at {}\n",
        report.scan_id,
        report.engine,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.verdicts.is_empty() {
        out.push_str("No processes hold a keyboard hook.\n");
    } else {
        out.push_str(&format!(
            "{:<8} {:<7} {:>5}  {:<24} {}\n",
            "PID", "TIER", "SCORE", "PROCESS", "REASONS"
        ));
        let mut rows: Vec<&Verdict> = report.verdicts.iter().collect();
        rows.sort_by(|a, b| b.risk_tier.cmp(&a.risk_tier).then(a.process_id.cmp(&b.process_id)));
        for v in rows {
            out.push_str(&format!(
                "{:<8} {:<7} {:>5}  {:<24} {}\n",
                v.process_id,
                v.risk_tier.as_str(),
                v.threat_score,
                v.process_name,
                v.reason_tags().join(", ")
            ));
        }
    }

    let dist = report.distribution();
    out.push_str(&format!(
        "Total {}: {} high, {} medium, {} low, {} clean\n",
        report.verdicts.len(),
        dist.high,
        dist.medium,
        dist.low,
        dist.clean
    ));
    if !report.dropped_races.is_empty() {
        out.push_str(&format!("Exited during scan: {:?}\n", report.dropped_races));
    }
    if report.partial {
        out.push_str(&format!(
            "PARTIAL SCAN: {} collector issue(s); results may be incomplete\n",
            report.issues.len()
        ));
    }
    out
}

/// One line per cycle while monitoring
pub fn render_cycle_line(report: &ScanReport) -> String {
    let dist = report.distribution();
    let mut line = format!(
        "[{}] {} hooked: {} high, {} medium, {} low",
        report.completed_at.format("%H:%M:%S"),
        report.verdicts.len(),
        dist.high,
        dist.medium,
        dist.low
    );
    if !report.hooks_added.is_empty() {
        line.push_str(&format!(" | new hooks {:?}", report.hooks_added));
    }
    if !report.hooks_removed.is_empty() {
        line.push_str(&format!(" | gone {:?}", report.hooks_removed));
    }
    if report.partial {
        line.push_str(" | partial");
    }
    line
}

pub fn render_rules(rules: &[RuleInfo]) -> String {
    let mut out = format!("{:<6} {:<36} {:>6}  {}\n", "ID", "INDICATOR", "WEIGHT", "DESCRIPTION");
    for rule in rules {
        out.push_str(&format!(
            "{:<6} {:<36} {:>6}  {}\n",
            rule.id,
            rule.indicator.as_str(),
            rule.weight,
            rule.description
        ));
    }
    out
}

pub fn render_policy(status: &PolicyStatus) -> String {
    format!(
        "{} v{}\n  engine:        {} (sensitivity {})\n  interval:      {}s\n  trust store:   {}\n                 {}\n  sources:       {}\n  export dir:    {}\n",
        status.app,
        status.version,
        status.engine,
        status.sensitivity,
        status.monitor_interval_secs,
        status.trust_store,
        status.trust_summary,
        status.sources,
        status.export_dir
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::report::read_verdicts;
    use crate::logic::threat::EngineVariant;

    fn mock_config(dir: &Path) -> AppConfig {
        AppConfig {
            export_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&mock_config(dir.path()), true).unwrap();

        let report = run_snapshot(&session).unwrap();
        let text = render_report(&report);
        assert!(text.contains("Total 8: 4 high, 1 medium, 1 low, 2 clean"));
        assert!(text.contains("keylogger_keyword") || text.contains("name_spoofing"));
        assert!(!text.contains("PARTIAL"));
    }

    #[test]
    fn test_live_sources_without_enumerator_are_partial() {
        let config = AppConfig::default();
        let sources = build_sources(&config, false);
        assert_eq!(sources.hooks.name(), "hooks-unavailable");
        assert!(!sources.hooks.enumerate().is_complete());
    }

    #[test]
    fn test_export_to_explicit_output() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&mock_config(dir.path()), true).unwrap();
        run_snapshot(&session).unwrap();

        let output = dir.path().join("out").join("verdicts.csv");
        let result = export_history(&session, ExportFormat::Csv, Some(&output), dir.path()).unwrap();
        assert_eq!(result.verdicts_file, output);
        assert_eq!(result.verdict_count, 8);

        let file = std::fs::File::open(&output).unwrap();
        assert_eq!(read_verdicts(ExportFormat::Csv, file).unwrap().len(), 8);
    }

    #[test]
    fn test_export_count_matches_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&mock_config(dir.path()), true).unwrap();
        run_snapshot(&session).unwrap();
        run_snapshot(&session).unwrap();

        let result = export_history(&session, ExportFormat::Json, None, dir.path()).unwrap();
        let file = std::fs::File::open(&result.verdicts_file).unwrap();
        let written = read_verdicts(ExportFormat::Json, file).unwrap();
        assert_eq!(result.verdict_count, written.len());
        assert_eq!(result.verdict_count, 16);
    }

    #[test]
    fn test_export_with_summary() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&mock_config(dir.path()), true).unwrap();
        run_snapshot(&session).unwrap();

        let result = export_with_summary(&session, ExportFormat::Json, dir.path()).unwrap();
        assert!(result.verdicts_file.exists());
        assert!(result.summary_file.unwrap().exists());
    }

    #[test]
    fn test_rules_follow_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = mock_config(dir.path());
        let tiered = get_rules(&open_session(&config, true).unwrap()).unwrap();
        assert_eq!(tiered.len(), 6);

        config.engine = EngineVariant::Legacy;
        let legacy = get_rules(&open_session(&config, true).unwrap()).unwrap();
        assert_eq!(legacy.len(), 9);
        assert!(render_rules(&legacy).contains("multiple_hooks"));
    }

    #[test]
    fn test_policy_status() {
        let status = get_policy(&AppConfig::default(), true).unwrap();
        assert_eq!(status.engine, "tiered");
        assert_eq!(status.trust_store, "built-in");
        assert!(render_policy(&status).contains("Keyguard"));
    }
}

//! Error Taxonomy
//!
//! Collector degradation (`CollectorUnavailable`, `RaceLoss`) is recorded on
//! the scan report and never aborts a cycle. Configuration and export errors
//! are surfaced to the caller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectorError>;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// An external source could not be queried (privilege, missing tool, ...)
    #[error("collector unavailable ({source_name}): {reason}")]
    CollectorUnavailable {
        source_name: &'static str,
        reason: String,
    },

    /// Process exited between hook enumeration and lookup
    #[error("process {pid} exited during enumeration")]
    RaceLoss { pid: u32 },

    /// Malformed trust store or application config
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sink not writable; history is left intact
    #[error("export failed: {0}")]
    ExportFailure(String),

    /// Previously exported data could not be read back
    #[error("import failed: {0}")]
    ImportFailure(String),

    #[error("session has been terminated")]
    SessionTerminated,

    #[error("monitoring is already running")]
    MonitorAlreadyRunning,

    #[error("monitor could not start: {0}")]
    MonitorStart(String),
}

impl DetectorError {
    pub fn collector(source_name: &'static str, reason: impl Into<String>) -> Self {
        DetectorError::CollectorUnavailable {
            source_name,
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        DetectorError::InvalidConfiguration(msg.into())
    }

    /// True for errors the scan cycle recovers from locally
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DetectorError::CollectorUnavailable { .. } | DetectorError::RaceLoss { .. }
        )
    }
}

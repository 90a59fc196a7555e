//! Report Module
//!
//! Verdict export/import (JSON, CSV) and summary reports.

pub mod exporter;
pub mod summary;

pub use exporter::{
    export_to_dir,
    export_verdicts,
    host_name,
    read_verdicts,
    ExportFormat,
    VerdictExport,
};

pub use summary::{HighRiskProcess, RiskDistribution, SummaryReport};

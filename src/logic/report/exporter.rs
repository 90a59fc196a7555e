//! Verdict Exporter
//!
//! Writes the verdict set as JSON (envelope) or CSV and reads either back.
//! Both formats keep every verdict field and the original order.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::error::{DetectorError, Result};
use crate::logic::threat::{Indicator, RiskTier, Verdict};

const REASON_SEPARATOR: &str = ";";

// ============================================================================
// EXPORT FORMATS
// ============================================================================

/// Supported export formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON envelope with the full verdict list
    #[default]
    Json,
    /// One row per verdict, reasons `;`-joined
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DetectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(DetectorError::config(format!(
                "unknown export format '{}' (valid: json, csv)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

// ============================================================================
// RECORD SHAPES
// ============================================================================

/// JSON export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictExport {
    pub report_type: String,
    pub generated_at: DateTime<Utc>,
    pub host: String,
    pub total: usize,
    pub verdicts: Vec<Verdict>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    scan_id: Option<Uuid>,
    process_id: u32,
    process_name: String,
    binary_path: String,
    risk_tier: RiskTier,
    threat_score: u32,
    reasons: String,
    timestamp: DateTime<Utc>,
}

impl From<&Verdict> for CsvRow {
    fn from(v: &Verdict) -> Self {
        Self {
            scan_id: v.scan_id,
            process_id: v.process_id,
            process_name: v.process_name.clone(),
            binary_path: v.binary_path.clone(),
            risk_tier: v.risk_tier,
            threat_score: v.threat_score,
            reasons: v.reason_tags().join(REASON_SEPARATOR),
            timestamp: v.timestamp,
        }
    }
}

impl CsvRow {
    fn into_verdict(self) -> Result<Verdict> {
        let reasons = self
            .reasons
            .split(REASON_SEPARATOR)
            .filter(|tag| !tag.trim().is_empty())
            .map(|tag| {
                Indicator::from_name(tag)
                    .ok_or_else(|| DetectorError::ImportFailure(format!("unknown reason tag '{}'", tag)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Verdict {
            scan_id: self.scan_id,
            process_id: self.process_id,
            process_name: self.process_name,
            binary_path: self.binary_path,
            risk_tier: self.risk_tier,
            threat_score: self.threat_score,
            reasons,
            timestamp: self.timestamp,
        })
    }
}

/// Host name for export provenance
pub fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

// ============================================================================
// EXPORT FUNCTIONS
// ============================================================================

/// Write verdicts to any sink. Returns the number written.
pub fn export_verdicts<W: Write>(verdicts: &[Verdict], format: ExportFormat, mut writer: W) -> Result<usize> {
    let fail = |e: &dyn std::fmt::Display| DetectorError::ExportFailure(e.to_string());

    match format {
        ExportFormat::Json => {
            let doc = VerdictExport {
                report_type: "verdicts".to_string(),
                generated_at: Utc::now(),
                host: host_name(),
                total: verdicts.len(),
                verdicts: verdicts.to_vec(),
            };
            serde_json::to_writer_pretty(&mut writer, &doc).map_err(|e| fail(&e))?;
            writer.write_all(b"\n").map_err(|e| fail(&e))?;
        }
        ExportFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            for verdict in verdicts {
                csv_writer.serialize(CsvRow::from(verdict)).map_err(|e| fail(&e))?;
            }
            if verdicts.is_empty() {
                csv_writer
                    .write_record(CSV_HEADER)
                    .map_err(|e| fail(&e))?;
            }
            csv_writer.flush().map_err(|e| fail(&e))?;
        }
    }

    writer.flush().map_err(|e| fail(&e))?;
    Ok(verdicts.len())
}

/// Header written explicitly when there are no rows to derive it from
const CSV_HEADER: [&str; 8] = [
    "scan_id",
    "process_id",
    "process_name",
    "binary_path",
    "risk_tier",
    "threat_score",
    "reasons",
    "timestamp",
];

/// Read verdicts previously written by `export_verdicts`
pub fn read_verdicts<R: Read>(format: ExportFormat, reader: R) -> Result<Vec<Verdict>> {
    match format {
        ExportFormat::Json => {
            let doc: VerdictExport = serde_json::from_reader(reader)
                .map_err(|e| DetectorError::ImportFailure(e.to_string()))?;
            if doc.total != doc.verdicts.len() {
                return Err(DetectorError::ImportFailure(format!(
                    "envelope says {} verdicts, found {}",
                    doc.total,
                    doc.verdicts.len()
                )));
            }
            Ok(doc.verdicts)
        }
        ExportFormat::Csv => {
            let mut csv_reader = csv::Reader::from_reader(reader);
            csv_reader
                .deserialize::<CsvRow>()
                .map(|row| {
                    row.map_err(|e| DetectorError::ImportFailure(e.to_string()))?
                        .into_verdict()
                })
                .collect()
        }
    }
}

/// Write to `<dir>/verdicts_YYYYmmdd_HHMMSS.<ext>`, creating `dir` if needed.
/// Returns the file and the number of verdicts written to it.
pub fn export_to_dir(verdicts: &[Verdict], format: ExportFormat, dir: &Path) -> Result<(PathBuf, usize)> {
    let path = timestamped_path(dir, "verdicts", format.extension());
    let file = create_file(&path)?;
    let count = export_verdicts(verdicts, format, std::io::BufWriter::new(file))?;
    log::info!("Exported {} verdicts to {}", count, path.display());
    Ok((path, count))
}

pub(crate) fn timestamped_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.{}", prefix, stamp, extension))
}

pub(crate) fn create_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DetectorError::ExportFailure(format!("{}: {}", parent.display(), e)))?;
    }
    fs::File::create(path).map_err(|e| DetectorError::ExportFailure(format!("{}: {}", path.display(), e)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_verdicts() -> Vec<Verdict> {
        let scan = Uuid::new_v4();
        vec![
            Verdict {
                scan_id: Some(scan),
                process_id: 4120,
                process_name: "badproc.exe".into(),
                binary_path: r"C:\Temp\bad, proc.exe".into(),
                risk_tier: RiskTier::High,
                threat_score: 4,
                reasons: vec![
                    Indicator::UnsignedBinary,
                    Indicator::SuspiciousLocation,
                    Indicator::UnknownPublisherNonstandardPath,
                    Indicator::HiddenWindow,
                ],
                timestamp: Utc::now(),
            },
            Verdict {
                scan_id: None,
                process_id: 7300,
                process_name: "setpoint.exe".into(),
                binary_path: String::new(),
                risk_tier: RiskTier::Clean,
                threat_score: 0,
                reasons: vec![],
                timestamp: Utc::now(),
            },
        ]
    }

    #[test]
    fn test_json_round_trip() {
        let verdicts = sample_verdicts();
        let mut buf = Vec::new();
        assert_eq!(export_verdicts(&verdicts, ExportFormat::Json, &mut buf).unwrap(), 2);

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["report_type"], "verdicts");
        assert_eq!(parsed["total"], 2);
        assert_eq!(parsed["verdicts"][0]["risk_tier"], "HIGH");
        assert_eq!(parsed["verdicts"][0]["reasons"][0], "unsigned_binary");

        assert_eq!(read_verdicts(ExportFormat::Json, buf.as_slice()).unwrap(), verdicts);
    }

    #[test]
    fn test_csv_round_trip() {
        let verdicts = sample_verdicts();
        let mut buf = Vec::new();
        export_verdicts(&verdicts, ExportFormat::Csv, &mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 verdicts
        assert!(lines[0].starts_with("scan_id,process_id"));
        assert!(lines[1].contains("unsigned_binary;suspicious_location"));

        assert_eq!(read_verdicts(ExportFormat::Csv, buf.as_slice()).unwrap(), verdicts);
    }

    #[test]
    fn test_empty_csv_has_header() {
        let mut buf = Vec::new();
        export_verdicts(&[], ExportFormat::Csv, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.trim(), CSV_HEADER.join(","));
        assert!(read_verdicts(ExportFormat::Csv, buf.as_slice()).unwrap().is_empty());
    }

    #[test]
    fn test_import_rejects_unknown_tag() {
        let csv = "scan_id,process_id,process_name,binary_path,risk_tier,threat_score,reasons,timestamp\n\
                   ,1,a.exe,,LOW,1,made_up,2024-01-01T00:00:00Z\n";
        let err = read_verdicts(ExportFormat::Csv, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DetectorError::ImportFailure(_)));
    }

    #[test]
    fn test_export_to_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("reports");
        let (path, count) = export_to_dir(&sample_verdicts(), ExportFormat::Csv, &nested).unwrap();

        assert_eq!(count, 2);
        assert!(path.starts_with(&nested));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("verdicts_"));
        let file = fs::File::open(&path).unwrap();
        assert_eq!(read_verdicts(ExportFormat::Csv, file).unwrap().len(), 2);
    }

    #[test]
    fn test_unwritable_sink_is_export_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let err = export_to_dir(&sample_verdicts(), ExportFormat::Json, &blocker.join("sub")).unwrap_err();
        assert!(matches!(err, DetectorError::ExportFailure(_)));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("yaml".parse::<ExportFormat>().is_err());
    }
}

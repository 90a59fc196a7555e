//! Logic Module - Detection Engines
//!
//! ## Pipeline
//! - `evidence/` - Hook, process and signature collection into evidence records
//! - `trust/` - Whitelist and indicator reference data
//! - `threat/` - Scoring engines (tiered, legacy heuristic)
//! - `session/` - Snapshot / monitoring driver and detection history
//! - `report/` - JSON/CSV export and summaries

pub mod config;
pub mod error;

pub mod evidence;
pub mod report;
pub mod session;
pub mod threat;
pub mod trust;

pub use config::AppConfig;
pub use error::{DetectorError, Result};

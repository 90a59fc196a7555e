//! Session Module
//!
//! Snapshot and continuous-monitoring driver around the scoring engine.
//!
//! ## Structure
//! - `types`: Session state and scan report
//! - `history`: Append-only detection history and its filters
//! - `machine`: `Session` (scan, export, clear, shutdown)
//! - `monitor`: Interval loop with cooperative cancellation

pub mod types;
pub mod history;
pub mod machine;
pub mod monitor;


pub use types::{ScanReport, SessionState};
pub use history::{DetectionHistory, HistoryFilter};
pub use machine::Session;
pub use monitor::CycleObserver;

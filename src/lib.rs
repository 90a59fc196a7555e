//! Keyguard Core
//!
//! Detects processes holding keyboard hooks and classifies them as
//! CLEAN/LOW/MEDIUM/HIGH keylogger risk.
//!
//! - `logic`: trust store, evidence collection, scoring engines, session, reports
//! - `api`: command handlers used by the `keyguard` binary

pub mod api;
pub mod constants;
pub mod logic;

//! API Module
//!
//! Structure:
//! - commands.rs: Handlers called by the `keyguard` binary
//!
//! Usage:
//! - `api::commands::open_session(&config, mock)`
//! - `api::run_snapshot(&session)` - re-exported at module root

pub mod commands;

pub use commands::*;

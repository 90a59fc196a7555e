//! Central Configuration Constants
//!
//! Single source of truth for defaults and environment variable names.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Keyguard";

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "keyguard";

/// Default pause between monitoring cycles (seconds)
pub const DEFAULT_MONITOR_INTERVAL_SECS: f64 = 2.0;

// ============================================
// Environment overrides
// ============================================

pub const ENV_ENGINE: &str = "KEYGUARD_ENGINE";
pub const ENV_SENSITIVITY: &str = "KEYGUARD_SENSITIVITY";
pub const ENV_INTERVAL_SECS: &str = "KEYGUARD_INTERVAL_SECS";
pub const ENV_TRUST_STORE: &str = "KEYGUARD_TRUST_STORE";
pub const ENV_HOOKS_FILE: &str = "KEYGUARD_HOOKS_FILE";
pub const ENV_EXPORT_DIR: &str = "KEYGUARD_EXPORT_DIR";
/// Read by clap for `--config`
pub const ENV_CONFIG: &str = "KEYGUARD_CONFIG";

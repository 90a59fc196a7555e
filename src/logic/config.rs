//! Application Configuration
//!
//! Loaded from defaults, then an optional JSON file, then `KEYGUARD_*`
//! environment overrides. CLI flags are applied last by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::error::{DetectorError, Result};
use crate::logic::threat::{EngineVariant, Sensitivity};
use crate::logic::trust::{load_trust_store, TrustStore};

// ============================================================================
// APP CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub engine: EngineVariant,
    /// Only read by the legacy engine
    pub sensitivity: Sensitivity,
    /// Must be > 0
    pub monitor_interval_secs: f64,
    /// JSON trust policy; built-in lists when unset
    pub trust_store_path: Option<PathBuf>,
    /// Output of an external hook enumerator
    pub hooks_file: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineVariant::default(),
            sensitivity: Sensitivity::default(),
            monitor_interval_secs: constants::DEFAULT_MONITOR_INTERVAL_SECS,
            trust_store_path: None,
            hooks_file: None,
            export_dir: default_export_dir(),
        }
    }
}

/// `<data_local_dir>/keyguard/reports`, or `./reports` when unknown
pub fn default_export_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(constants::DATA_DIR_NAME).join("reports"))
        .unwrap_or_else(|| PathBuf::from("reports"))
}

impl AppConfig {
    /// Defaults, then `path` if given, then process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DetectorError::config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DetectorError::config(format!("{}: {}", path.display(), e)))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `KEYGUARD_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(constants::ENV_ENGINE) {
            self.engine = v.parse()?;
        }
        if let Some(v) = get(constants::ENV_SENSITIVITY) {
            self.sensitivity = v.parse()?;
        }
        if let Some(v) = get(constants::ENV_INTERVAL_SECS) {
            self.monitor_interval_secs = v.trim().parse().map_err(|_| {
                DetectorError::config(format!("{}: '{}' is not a number", constants::ENV_INTERVAL_SECS, v))
            })?;
        }
        if let Some(v) = get(constants::ENV_TRUST_STORE) {
            self.trust_store_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get(constants::ENV_HOOKS_FILE) {
            self.hooks_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get(constants::ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.monitor_interval_secs <= 0.0 || Duration::try_from_secs_f64(self.monitor_interval_secs).is_err() {
            return Err(DetectorError::config(format!(
                "monitor_interval_secs must be greater than zero (got {})",
                self.monitor_interval_secs
            )));
        }
        if self.export_dir.as_os_str().is_empty() {
            return Err(DetectorError::config("export_dir is empty"));
        }
        Ok(())
    }

    /// Falls back to the default when the configured value was never validated
    pub fn monitor_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.monitor_interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(constants::DEFAULT_MONITOR_INTERVAL_SECS))
    }

    /// Trust store from `trust_store_path`, or the built-in policy
    pub fn trust_store(&self) -> Result<Arc<TrustStore>> {
        let store = match &self.trust_store_path {
            Some(path) => load_trust_store(path)?,
            None => TrustStore::builtin()?,
        };
        Ok(Arc::new(store))
    }
}

// ============================================================================
// TESTS
// ============================================================================

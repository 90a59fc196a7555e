//! File-backed Hook Source
//!
//! Reads the output of an external hook enumerator, re-read on every cycle.
//! Accepted shapes:
//! - `[{"pid": 4120, "hook_type": "WH_KEYBOARD_LL"}, ...]`
//! - `{"hooks": [...], "denied": "not elevated"}`
//!
//! `hook_type` may be a name or the numeric hook id. An unreadable or
//! malformed file yields an empty partial snapshot.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use super::sources::HookSource;
use super::types::{HookEntry, HookSnapshot, HookType};

#[derive(Debug, Deserialize)]
struct RawHook {
    #[serde(alias = "owner_pid")]
    pid: u32,
    #[serde(deserialize_with = "hook_type_any")]
    hook_type: HookType,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFile {
    List(Vec<RawHook>),
    Wrapped {
        hooks: Vec<RawHook>,
        #[serde(default)]
        denied: Option<String>,
    },
}

fn hook_type_any<'de, D>(deserializer: D) -> std::result::Result<HookType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => HookType::from_name(&s),
        serde_json::Value::Number(n) => HookType::from_name(&n.to_string()),
        _ => HookType::Other,
    })
}

#[derive(Debug, Clone)]
pub struct JsonHookSource {
    path: PathBuf,
}

impl JsonHookSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HookSource for JsonHookSource {
    fn name(&self) -> &'static str {
        "hooks-file"
    }

    fn enumerate(&self) -> HookSnapshot {
        let data = match fs::read(&self.path) {
            Ok(d) => d,
            Err(e) => {
                return HookSnapshot::partial(
                    Vec::new(),
                    format!("cannot read {}: {}", self.path.display(), e),
                )
            }
        };

        let parsed: RawFile = match serde_json::from_slice(&data) {
            Ok(p) => p,
            Err(e) => {
                return HookSnapshot::partial(
                    Vec::new(),
                    format!("malformed {}: {}", self.path.display(), e),
                )
            }
        };

        let (hooks, denied) = match parsed {
            RawFile::List(hooks) => (hooks, None),
            RawFile::Wrapped { hooks, denied } => (hooks, denied),
        };

        let entries = hooks
            .into_iter()
            .map(|h| HookEntry {
                pid: h.pid,
                hook_type: h.hook_type,
            })
            .collect();

        HookSnapshot { entries, denied }
    }
}

/// Stand-in when no enumerator is configured: every cycle is an empty partial snapshot
#[derive(Debug, Clone)]
pub struct UnavailableHookSource {
    reason: String,
}

impl UnavailableHookSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl HookSource for UnavailableHookSource {
    fn name(&self) -> &'static str {
        "hooks-unavailable"
    }

    fn enumerate(&self) -> HookSnapshot {
        HookSnapshot::partial(Vec::new(), self.reason.clone())
    }
}

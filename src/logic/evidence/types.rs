//! Evidence Types
//!
//! Per-process facts gathered in one scan cycle. Missing or denied data is an
//! explicit `Unknown` variant, never a coerced boolean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::DetectorError;

// ============================================================================
// TRI-STATES
// ============================================================================

/// Authenticode state of a binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureState {
    Signed,
    Unsigned,
    /// Verification failed or was denied
    Unknown,
}

impl SignatureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
            Self::Unknown => "unknown",
        }
    }

    /// Only a confirmed `Unsigned` counts as evidence
    pub fn is_confirmed_unsigned(&self) -> bool {
        matches!(self, Self::Unsigned)
    }
}

/// Publisher from the binary's version metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "name")]
pub enum Publisher {
    Named(String),
    /// Binary carries no version info
    Absent,
    /// Lookup denied or failed
    Unknown,
}

impl Publisher {
    /// Blank names count as absent
    pub fn from_company(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(n) if !n.is_empty() => Self::Named(n.to_string()),
            _ => Self::Absent,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) => Some(n.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// HOOKS
// ============================================================================

/// Windows hook id as reported by the enumerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookType {
    #[serde(rename = "WH_KEYBOARD_LL")]
    KeyboardLowLevel,
    #[serde(rename = "WH_KEYBOARD")]
    Keyboard,
    #[serde(rename = "WH_MOUSE_LL")]
    MouseLowLevel,
    #[serde(rename = "WH_MOUSE")]
    Mouse,
    #[serde(other)]
    Other,
}

impl HookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyboardLowLevel => "WH_KEYBOARD_LL",
            Self::Keyboard => "WH_KEYBOARD",
            Self::MouseLowLevel => "WH_MOUSE_LL",
            Self::Mouse => "WH_MOUSE",
            Self::Other => "OTHER",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "WH_KEYBOARD_LL" | "13" => Self::KeyboardLowLevel,
            "WH_KEYBOARD" | "2" => Self::Keyboard,
            "WH_MOUSE_LL" | "14" => Self::MouseLowLevel,
            "WH_MOUSE" | "7" => Self::Mouse,
            _ => Self::Other,
        }
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, Self::KeyboardLowLevel | Self::Keyboard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEntry {
    pub pid: u32,
    pub hook_type: HookType,
}

/// Result of one hook enumeration. Denied access yields fewer entries plus a reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSnapshot {
    pub entries: Vec<HookEntry>,
    pub denied: Option<String>,
}

impl HookSnapshot {
    pub fn complete(entries: Vec<HookEntry>) -> Self {
        Self { entries, denied: None }
    }

    pub fn partial(entries: Vec<HookEntry>, reason: impl Into<String>) -> Self {
        Self {
            entries,
            denied: Some(reason.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.denied.is_none()
    }
}

// ============================================================================
// COLLABORATOR RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub state: SignatureState,
    pub publisher: Publisher,
}

impl SignatureInfo {
    pub fn unknown() -> Self {
        Self {
            state: SignatureState::Unknown,
            publisher: Publisher::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDetails {
    pub binary_name: String,
    /// Empty when the image path is inaccessible
    pub binary_path: String,
    pub window_hidden: bool,
    /// Parent PID is known and that process is gone
    pub parent_exited: bool,
    /// Started by the service control manager
    pub is_service: bool,
}

/// Degradation recorded on a scan report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorIssue {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub detail: String,
}

impl CollectorIssue {
    pub fn from_error(pid: Option<u32>, err: &DetectorError) -> Self {
        match err {
            DetectorError::CollectorUnavailable { source_name, reason } => Self {
                source: source_name.to_string(),
                pid,
                detail: reason.clone(),
            },
            other => Self {
                source: "collector".to_string(),
                pid,
                detail: other.to_string(),
            },
        }
    }
}

// ============================================================================
// EVIDENCE RECORD
// ============================================================================

/// One hooked process in one scan cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub process_id: u32,
    pub binary_name: String,
    pub binary_path: String,
    pub publisher: Publisher,
    pub is_signed: SignatureState,
    pub has_keyboard_hook: bool,
    pub hook_count: u32,
    pub window_hidden: bool,
    pub matches_known_system_name: bool,
    #[serde(default)]
    pub parent_exited: bool,
    #[serde(default)]
    pub is_service: bool,
    pub observed_at: DateTime<Utc>,
}

impl EvidenceRecord {
    /// Hooked record with the weakest evidence in every optional field
    pub fn hooked(process_id: u32, binary_name: &str, binary_path: &str) -> Self {
        Self {
            process_id,
            binary_name: binary_name.trim().to_lowercase(),
            binary_path: binary_path.to_string(),
            publisher: Publisher::Unknown,
            is_signed: SignatureState::Unknown,
            has_keyboard_hook: true,
            hook_count: 1,
            window_hidden: false,
            matches_known_system_name: false,
            parent_exited: false,
            is_service: false,
            observed_at: Utc::now(),
        }
    }

    pub fn with_signature(mut self, state: SignatureState) -> Self {
        self.is_signed = state;
        self
    }

    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_hidden_window(mut self, hidden: bool) -> Self {
        self.window_hidden = hidden;
        self
    }

    pub fn with_system_name(mut self, matches: bool) -> Self {
        self.matches_known_system_name = matches;
        self
    }

    pub fn with_parent_exited(mut self, exited: bool) -> Self {
        self.parent_exited = exited;
        self
    }

    pub fn with_service(mut self, service: bool) -> Self {
        self.is_service = service;
        self
    }

    pub fn with_hook_count(mut self, count: u32) -> Self {
        self.hook_count = count;
        self
    }

    pub fn observed(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = at;
        self
    }
}

//! Trust Policy Types
//!
//! On-disk policy format. No lookup logic here.

use serde::{Deserialize, Serialize};

use super::defaults::{self, owned};

/// Policy file contents. Omitted lists fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrustPolicy {
    pub known_safe_names: Vec<String>,
    pub trusted_publishers: Vec<String>,
    pub trusted_path_prefixes: Vec<String>,
    pub suspicious_path_patterns: Vec<String>,
    pub keylogger_keywords: Vec<String>,
    pub system_binary_names: Vec<String>,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            known_safe_names: owned(defaults::KNOWN_SAFE_NAMES),
            trusted_publishers: owned(defaults::TRUSTED_PUBLISHERS),
            trusted_path_prefixes: owned(defaults::TRUSTED_PATH_PREFIXES),
            suspicious_path_patterns: owned(defaults::SUSPICIOUS_PATH_PATTERNS),
            keylogger_keywords: owned(defaults::KEYLOGGER_KEYWORDS),
            system_binary_names: owned(defaults::SYSTEM_BINARY_NAMES),
        }
    }
}

impl TrustPolicy {
    /// Policy with every list empty (tests build synthetic stores from this)
    pub fn empty() -> Self {
        Self {
            known_safe_names: vec![],
            trusted_publishers: vec![],
            trusted_path_prefixes: vec![],
            suspicious_path_patterns: vec![],
            keylogger_keywords: vec![],
            system_binary_names: vec![],
        }
    }
}

/// Entry counts, for logging and the `policy` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrustSummary {
    pub known_safe_names: usize,
    pub trusted_publishers: usize,
    pub trusted_path_prefixes: usize,
    pub suspicious_path_patterns: usize,
    pub keylogger_keywords: usize,
    pub system_binary_names: usize,
}

impl std::fmt::Display for TrustSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} safe names, {} publishers, {} trusted prefixes, {} suspicious patterns, {} keywords, {} system names",
            self.known_safe_names,
            self.trusted_publishers,
            self.trusted_path_prefixes,
            self.suspicious_path_patterns,
            self.keylogger_keywords,
            self.system_binary_names
        )
    }
}

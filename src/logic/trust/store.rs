//! Trust Store
//!
//! Immutable lookup structure built once per run from a `TrustPolicy`.
//! All membership tests are case-insensitive and separator-normalized.
//! The store is `Send + Sync` and shared by reference (or `Arc`) with every
//! classifier; nothing mutates it after `from_policy` returns.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::RegexSet;

use super::types::{TrustPolicy, TrustSummary};
use crate::logic::error::{DetectorError, Result};

/// Corporate suffixes dropped when normalizing publisher names
const PUBLISHER_SUFFIXES: &[&str] = &[
    "inc", "llc", "ltd", "corp", "corporation", "co", "gmbh", "aps", "ab", "s.r.o",
    "limited", "incorporated", "llp", "pty",
];

/// Marks a suspicious-path entry as a regex rather than a literal fragment
pub const REGEX_PATTERN_PREFIX: &str = "re:";

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Lowercase, trimmed binary name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lowercase, `/` -> `\`, repeated separators collapsed (a leading UNC `\\` is kept)
pub fn normalize_path(path: &str) -> String {
    let lowered = path.trim().to_lowercase().replace('/', "\\");
    let mut out = String::with_capacity(lowered.len());
    let mut prev_sep = false;

    for (i, ch) in lowered.chars().enumerate() {
        if ch == '\\' {
            if prev_sep && i > 1 {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(ch);
    }

    out
}

/// Canonical publisher form: `"Logitech Inc."` and `"logitech"` compare equal
pub fn normalize_publisher(publisher: &str) -> String {
    let cleaned = publisher.to_lowercase().replace(',', " ");
    let mut words: Vec<&str> = cleaned.split_whitespace().collect();

    loop {
        if words.len() <= 1 {
            break;
        }
        let last = words[words.len() - 1].trim_end_matches('.');
        if PUBLISHER_SUFFIXES.contains(&last) {
            words.pop();
        } else {
            break;
        }
    }

    words.join(" ").trim_end_matches('.').to_string()
}

/// Separator-aware prefix test on already-normalized strings
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() || !path.starts_with(prefix) {
        return false;
    }
    if prefix.ends_with('\\') || path.len() == prefix.len() {
        return true;
    }
    path[prefix.len()..].starts_with('\\')
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct TrustStore {
    known_safe_names: HashSet<String>,
    trusted_publishers: HashSet<String>,
    trusted_path_prefixes: Vec<String>,
    suspicious_patterns: RegexSet,
    keylogger_keywords: Vec<String>,
    system_binary_names: HashSet<String>,
}

impl TrustStore {
    /// Validate and normalize a policy. Any malformed entry is fatal.
    pub fn from_policy(policy: &TrustPolicy) -> Result<Self> {
        let known_safe_names = normalized_set("known_safe_names", &policy.known_safe_names, normalize_name)?;
        let system_binary_names =
            normalized_set("system_binary_names", &policy.system_binary_names, normalize_name)?;
        let trusted_publishers =
            normalized_set("trusted_publishers", &policy.trusted_publishers, |p| normalize_publisher(p))?;

        if let Some(name) = known_safe_names.iter().find(|n| system_binary_names.contains(*n)) {
            return Err(DetectorError::config(format!(
                "'{}' is both a known-safe name and a reserved system name; impersonation of it could never be flagged",
                name
            )));
        }

        let mut trusted_path_prefixes: Vec<String> = Vec::new();
        for raw in &policy.trusted_path_prefixes {
            let prefix = normalize_path(raw);
            check_not_empty("trusted_path_prefixes", &prefix)?;
            if !trusted_path_prefixes.contains(&prefix) {
                trusted_path_prefixes.push(prefix);
            }
        }

        let mut patterns: Vec<String> = Vec::with_capacity(policy.suspicious_path_patterns.len());
        for raw in &policy.suspicious_path_patterns {
            patterns.push(path_pattern(raw)?);
        }
        let suspicious_patterns = RegexSet::new(&patterns)
            .map_err(|e| DetectorError::config(format!("suspicious_path_patterns: {}", e)))?;

        let mut keylogger_keywords: Vec<String> = Vec::new();
        for raw in &policy.keylogger_keywords {
            let keyword = normalize_name(raw);
            check_not_empty("keylogger_keywords", &keyword)?;
            if !keylogger_keywords.contains(&keyword) {
                keylogger_keywords.push(keyword);
            }
        }

        Ok(Self {
            known_safe_names,
            trusted_publishers,
            trusted_path_prefixes,
            suspicious_patterns,
            keylogger_keywords,
            system_binary_names,
        })
    }

    /// Store built from the built-in policy
    pub fn builtin() -> Result<Self> {
        Self::from_policy(&TrustPolicy::default())
    }

    pub fn is_known_safe(&self, binary_name: &str) -> bool {
        self.known_safe_names.contains(&normalize_name(binary_name))
    }

    pub fn is_trusted_publisher(&self, publisher: &str) -> bool {
        self.trusted_publishers.contains(&normalize_publisher(publisher))
    }

    /// True when the path sits under any trusted installation prefix
    pub fn is_trusted_path(&self, binary_path: &str) -> bool {
        let path = normalize_path(binary_path);
        if path.is_empty() {
            return false;
        }
        self.trusted_path_prefixes.iter().any(|prefix| path_has_prefix(&path, prefix))
    }

    pub fn is_suspicious_path(&self, binary_path: &str) -> bool {
        let path = normalize_path(binary_path);
        !path.is_empty() && self.suspicious_patterns.is_match(&path)
    }

    /// Keywords found in the binary name or path, in policy order
    pub fn matched_keywords(&self, binary_name: &str, binary_path: &str) -> Vec<&str> {
        let haystack = format!("{} {}", normalize_name(binary_name), normalize_path(binary_path));
        self.keylogger_keywords
            .iter()
            .filter(|kw| haystack.contains(kw.as_str()))
            .map(|kw| kw.as_str())
            .collect()
    }

    pub fn is_system_binary_name(&self, binary_name: &str) -> bool {
        self.system_binary_names.contains(&normalize_name(binary_name))
    }

    pub fn trusted_path_prefixes(&self) -> &[String] {
        &self.trusted_path_prefixes
    }

    pub fn summary(&self) -> TrustSummary {
        TrustSummary {
            known_safe_names: self.known_safe_names.len(),
            trusted_publishers: self.trusted_publishers.len(),
            trusted_path_prefixes: self.trusted_path_prefixes.len(),
            suspicious_path_patterns: self.suspicious_patterns.len(),
            keylogger_keywords: self.keylogger_keywords.len(),
            system_binary_names: self.system_binary_names.len(),
        }
    }
}

fn check_not_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DetectorError::config(format!("{}: empty entry", field)));
    }
    Ok(())
}

/// Entries are literal path fragments, normalized like any path. A `re:`
/// prefix opts into a regex; `/` in it still stands for a separator.
fn path_pattern(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let pattern = match raw.strip_prefix(REGEX_PATTERN_PREFIX) {
        Some(body) => body.trim().replace('/', r"\\"),
        None => regex::escape(&normalize_path(raw)),
    };
    check_not_empty("suspicious_path_patterns", &pattern)?;
    Ok(format!("(?i){}", pattern))
}

fn normalized_set(
    field: &str,
    values: &[String],
    normalize: impl Fn(&str) -> String,
) -> Result<HashSet<String>> {
    let mut set = HashSet::with_capacity(values.len());
    for raw in values {
        let value = normalize(raw);
        check_not_empty(field, &value)?;
        set.insert(value);
    }
    Ok(set)
}

// ============================================================================
// LOADING
// ============================================================================

/// Load a policy file and build the store. Errors here stop the run before any scan.
pub fn load_trust_store(path: &Path) -> Result<TrustStore> {
    let data = fs::read(path).map_err(|e| {
        DetectorError::config(format!("cannot read trust policy {}: {}", path.display(), e))
    })?;
    let policy: TrustPolicy = serde_json::from_slice(&data).map_err(|e| {
        DetectorError::config(format!("malformed trust policy {}: {}", path.display(), e))
    })?;

    let store = TrustStore::from_policy(&policy)?;
    log::info!("Trust store loaded from {} ({})", path.display(), store.summary());
    Ok(store)
}

// ============================================================================
// TESTS
// ============================================================================

//! Authenticode Signature Source
//!
//! Queries `Get-AuthenticodeSignature` and the binary's version info through
//! PowerShell. Results are cached per normalized path; failures are not
//! cached so a later elevated run can succeed. Each query is bounded by
//! `QUERY_TIMEOUT`; a hung child is killed and reported as unavailable.

use std::collections::HashMap;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::sources::SignatureSource;
use super::types::{Publisher, SignatureInfo, SignatureState};
use crate::logic::error::{DetectorError, Result};
use crate::logic::trust::normalize_path;

const SOURCE_NAME: &str = "authenticode";
const CACHE_MAX_SIZE: usize = 1000;
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct AuthenticodeSignatureSource {
    cache: RwLock<HashMap<String, SignatureInfo>>,
}

impl AuthenticodeSignatureSource {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn query(binary_path: &str) -> Result<SignatureInfo> {
        let script = format!(
            r#"
            $sig = Get-AuthenticodeSignature -LiteralPath '{path}'
            $ver = (Get-Item -LiteralPath '{path}').VersionInfo
            @{{
                'Status' = $sig.Status.ToString()
                'CompanyName' = $ver.CompanyName
            }} | ConvertTo-Json -Compress
            "#,
            path = binary_path.replace('\'', "''")
        );

        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
        let output = output_within(command, QUERY_TIMEOUT)?;

        if !output.status.success() {
            return Err(DetectorError::collector(
                SOURCE_NAME,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        parse_signature_output(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for AuthenticodeSignatureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureSource for AuthenticodeSignatureSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn lookup(&self, binary_path: &str) -> Result<SignatureInfo> {
        let key = normalize_path(binary_path);
        if let Some(cached) = self.cache.read().get(&key) {
            return Ok(cached.clone());
        }

        let info = Self::query(binary_path)?;

        let mut cache = self.cache.write();
        if cache.len() >= CACHE_MAX_SIZE {
            // Simple eviction: clear half
            let keys: Vec<_> = cache.keys().take(CACHE_MAX_SIZE / 2).cloned().collect();
            for k in keys {
                cache.remove(&k);
            }
        }
        cache.insert(key, info.clone());

        Ok(info)
    }
}

/// `Command::output` with a deadline. The child is killed once it passes.
fn output_within(mut command: Command, timeout: Duration) -> Result<Output> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DetectorError::collector(SOURCE_NAME, format!("powershell unavailable: {}", e)))?;

    // drained on their own threads so a full pipe cannot stall the child
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                log::warn!("Signature query killed after {:?}", timeout);
                return Err(DetectorError::collector(
                    SOURCE_NAME,
                    format!("query timed out after {:?}", timeout),
                ));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(DetectorError::collector(SOURCE_NAME, format!("wait failed: {}", e)));
            }
        }
    };

    Ok(Output {
        status,
        stdout: collected(stdout),
        stderr: collected(stderr),
    })
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collected(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader.and_then(|r| r.join().ok()).unwrap_or_default()
}

/// Map PowerShell's JSON answer onto the tri-states
fn parse_signature_output(json_str: &str) -> Result<SignatureInfo> {
    let parsed: serde_json::Value = serde_json::from_str(json_str.trim())
        .map_err(|e| DetectorError::collector(SOURCE_NAME, format!("unparseable output: {}", e)))?;

    let state = match parsed["Status"].as_str().unwrap_or("") {
        "Valid" => SignatureState::Signed,
        // tampered signatures count as unsigned
        "NotSigned" | "HashMismatch" => SignatureState::Unsigned,
        _ => SignatureState::Unknown,
    };

    let publisher = Publisher::from_company(parsed["CompanyName"].as_str());

    Ok(SignatureInfo { state, publisher })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_signature() {
        let info = parse_signature_output(r#"{"Status":"Valid","CompanyName":"Logitech Inc."}"#).unwrap();
        assert_eq!(info.state, SignatureState::Signed);
        assert_eq!(info.publisher, Publisher::Named("Logitech Inc.".into()));
    }

    #[test]
    fn test_parse_unsigned_without_version_info() {
        let info = parse_signature_output(r#"{"Status":"NotSigned","CompanyName":null}"#).unwrap();
        assert_eq!(info.state, SignatureState::Unsigned);
        assert_eq!(info.publisher, Publisher::Absent);
    }

    #[test]
    fn test_parse_untrusted_root_is_unknown() {
        let info = parse_signature_output(r#"{"Status":"UnknownError","CompanyName":""}"#).unwrap();
        assert_eq!(info.state, SignatureState::Unknown);
    }

    #[test]
    fn test_parse_garbage_is_collector_error() {
        let err = parse_signature_output("Access is denied.").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_bounded_query_returns_output() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo signed"]);
        let output = output_within(command, Duration::from_secs(5)).unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "signed");
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_query_is_killed() {
        let mut command = Command::new("sleep");
        command.arg("30");
        let started = Instant::now();
        let err = output_within(command, Duration::from_millis(100)).unwrap_err();

        assert!(matches!(err, DetectorError::CollectorUnavailable { .. }));
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_binary_is_collector_error() {
        let command = Command::new("keyguard-no-such-binary");
        let err = output_within(command, Duration::from_secs(1)).unwrap_err();
        assert!(err.is_recoverable());
    }
}

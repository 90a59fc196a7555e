//! Collaborator Interfaces
//!
//! The hook enumerator, signature verifier and process lister live outside
//! the engine and are reached only through these traits.

use std::sync::Arc;

use super::types::{HookSnapshot, ProcessDetails, SignatureInfo};
use crate::logic::error::Result;

/// Lists processes currently holding hooks. Denied access shrinks the
/// snapshot, it never fails the call.
pub trait HookSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn enumerate(&self) -> HookSnapshot;
}

/// Signature and publisher for a binary path.
/// `Err(CollectorUnavailable)` is recorded and treated as unknown.
pub trait SignatureSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn lookup(&self, binary_path: &str) -> Result<SignatureInfo>;
}

/// PID resolution. `Ok(None)` means the process exited (race loss).
pub trait ProcessSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn lookup(&self, pid: u32) -> Result<Option<ProcessDetails>>;
}

/// The three collaborators wired together for a session
#[derive(Clone)]
pub struct EvidenceSources {
    pub hooks: Arc<dyn HookSource>,
    pub signatures: Arc<dyn SignatureSource>,
    pub processes: Arc<dyn ProcessSource>,
}

impl EvidenceSources {
    pub fn new(
        hooks: Arc<dyn HookSource>,
        signatures: Arc<dyn SignatureSource>,
        processes: Arc<dyn ProcessSource>,
    ) -> Self {
        Self {
            hooks,
            signatures,
            processes,
        }
    }

    /// All three roles served by one fixture
    pub fn from_single<S>(source: Arc<S>) -> Self
    where
        S: HookSource + SignatureSource + ProcessSource + 'static,
    {
        Self {
            hooks: source.clone(),
            signatures: source.clone(),
            processes: source,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "hooks={}, signatures={}, processes={}",
            self.hooks.name(),
            self.signatures.name(),
            self.processes.name()
        )
    }
}

impl std::fmt::Debug for EvidenceSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EvidenceSources({})", self.describe())
    }
}

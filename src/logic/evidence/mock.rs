//! Mock Collaborators
//!
//! Deterministic in-memory process table serving all three collaborator
//! roles. Used by `--mock` and by tests; fixtures can be changed between
//! cycles to drive hook appear/disappear tracking.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::sources::{HookSource, ProcessSource, SignatureSource};
use super::types::{
    HookEntry, HookSnapshot, HookType, ProcessDetails, Publisher, SignatureInfo, SignatureState,
};
use crate::logic::error::{DetectorError, Result};
use crate::logic::trust::normalize_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProcess {
    pub pid: u32,
    pub name: String,
    pub path: String,
    pub signature: SignatureState,
    pub publisher: Publisher,
    pub window_hidden: bool,
    pub parent_exited: bool,
    pub service: bool,
    pub hooks: Vec<HookType>,
}

impl MockProcess {
    pub fn new(pid: u32, name: &str, path: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            path: path.to_string(),
            signature: SignatureState::Unsigned,
            publisher: Publisher::Absent,
            window_hidden: false,
            parent_exited: false,
            service: false,
            hooks: Vec::new(),
        }
    }

    pub fn signature(mut self, state: SignatureState) -> Self {
        self.signature = state;
        self
    }

    pub fn publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.window_hidden = hidden;
        self
    }

    pub fn orphaned(mut self, exited: bool) -> Self {
        self.parent_exited = exited;
        self
    }

    pub fn service(mut self, service: bool) -> Self {
        self.service = service;
        self
    }

    pub fn hooks(mut self, hooks: &[HookType]) -> Self {
        self.hooks = hooks.to_vec();
        self
    }
}

#[derive(Debug, Default)]
pub struct MockSources {
    processes: RwLock<Vec<MockProcess>>,
    exited: RwLock<HashSet<u32>>,
    hooks_denied: RwLock<Option<String>>,
    signatures_denied: AtomicBool,
}

impl MockSources {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Demo host: one process per interesting verdict shape
    pub fn demo() -> Self {
        let microsoft = || Publisher::Named("Microsoft Corporation".to_string());
        let mock = Self::empty();

        // No hook: never scored
        mock.insert(
            MockProcess::new(1234, "svchost.exe", r"C:\Windows\System32\svchost.exe")
                .signature(SignatureState::Signed)
                .publisher(microsoft())
                .hidden(true)
                .service(true),
        );
        // Shell in its canonical location
        mock.insert(
            MockProcess::new(2248, "explorer.exe", r"C:\Windows\explorer.exe")
                .signature(SignatureState::Signed)
                .publisher(microsoft())
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        mock.insert(
            MockProcess::new(4120, "badproc.exe", r"C:\Temp\badproc.exe")
                .hidden(true)
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        mock.insert(
            MockProcess::new(8192, "unknown.exe", r"C:\Users\User\AppData\Local\Temp\unknown.exe")
                .hooks(&[HookType::Keyboard]),
        );
        // Mouse hook only
        mock.insert(
            MockProcess::new(5678, "chrome.exe", r"C:\Program Files\Google\Chrome\Application\chrome.exe")
                .signature(SignatureState::Signed)
                .publisher(Publisher::Named("Google LLC".to_string()))
                .hooks(&[HookType::MouseLowLevel]),
        );
        // Shell impersonation from a temp directory
        mock.insert(
            MockProcess::new(6100, "explorer.exe", r"C:\Users\a\AppData\Local\Temp\explorer.exe")
                .publisher(microsoft())
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        mock.insert(
            MockProcess::new(7300, "setpoint.exe", r"C:\Program Files\Logitech\setpoint.exe")
                .signature(SignatureState::Signed)
                .publisher(Publisher::Named("Logitech".to_string()))
                .hidden(true)
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        // Launcher already gone
        mock.insert(
            MockProcess::new(9001, "helper.exe", r"C:\Users\a\Downloads\helper.exe")
                .hidden(true)
                .orphaned(true)
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        // Remapper from an unknown vendor: hidden window only
        mock.insert(
            MockProcess::new(3344, "macrokeys.exe", r"C:\Tools\MacroKeys\macrokeys.exe")
                .signature(SignatureState::Signed)
                .publisher(Publisher::Named("Acme Input Ltd".to_string()))
                .hidden(true)
                .hooks(&[HookType::KeyboardLowLevel]),
        );
        // Signature check denied
        mock.insert(
            MockProcess::new(5120, "updater.exe", r"C:\ProgramData\Updater\updater.exe")
                .signature(SignatureState::Unknown)
                .publisher(Publisher::Unknown)
                .hidden(true)
                .hooks(&[HookType::Keyboard, HookType::KeyboardLowLevel]),
        );

        mock
    }

    /// Add a process, replacing any existing entry with the same PID
    pub fn insert(&self, process: MockProcess) {
        self.exited.write().remove(&process.pid);

        let mut processes = self.processes.write();
        match processes.iter_mut().find(|p| p.pid == process.pid) {
            Some(existing) => *existing = process,
            None => processes.push(process),
        }
    }

    pub fn remove(&self, pid: u32) {
        self.processes.write().retain(|p| p.pid != pid);
    }

    pub fn set_hooks(&self, pid: u32, hooks: &[HookType]) {
        if let Some(p) = self.processes.write().iter_mut().find(|p| p.pid == pid) {
            p.hooks = hooks.to_vec();
        }
    }

    /// Keep the hook listed but make PID lookups fail
    pub fn mark_exited(&self, pid: u32) {
        self.exited.write().insert(pid);
    }

    pub fn deny_signatures(&self, denied: bool) {
        self.signatures_denied.store(denied, Ordering::SeqCst);
    }

    pub fn deny_hooks(&self, reason: Option<&str>) {
        *self.hooks_denied.write() = reason.map(str::to_string);
    }
}

impl HookSource for MockSources {
    fn name(&self) -> &'static str {
        "mock-hooks"
    }

    fn enumerate(&self) -> HookSnapshot {
        let entries: Vec<HookEntry> = self
            .processes
            .read()
            .iter()
            .flat_map(|p| p.hooks.iter().map(move |&hook_type| HookEntry { pid: p.pid, hook_type }))
            .collect();

        match self.hooks_denied.read().as_deref() {
            // denied enumeration sees only the first half of the table
            Some(reason) => {
                let keep = entries.len() / 2;
                HookSnapshot::partial(entries.into_iter().take(keep).collect(), reason)
            }
            None => HookSnapshot::complete(entries),
        }
    }
}

impl SignatureSource for MockSources {
    fn name(&self) -> &'static str {
        "mock-signatures"
    }

    fn lookup(&self, binary_path: &str) -> Result<SignatureInfo> {
        if self.signatures_denied.load(Ordering::SeqCst) {
            return Err(DetectorError::collector("mock-signatures", "access denied"));
        }

        let wanted = normalize_path(binary_path);
        let info = self
            .processes
            .read()
            .iter()
            .find(|p| normalize_path(&p.path) == wanted)
            .map(|p| SignatureInfo {
                state: p.signature,
                publisher: p.publisher.clone(),
            })
            .unwrap_or_else(SignatureInfo::unknown);

        Ok(info)
    }
}

impl ProcessSource for MockSources {
    fn name(&self) -> &'static str {
        "mock-processes"
    }

    fn lookup(&self, pid: u32) -> Result<Option<ProcessDetails>> {
        if self.exited.read().contains(&pid) {
            return Ok(None);
        }

        Ok(self.processes.read().iter().find(|p| p.pid == pid).map(|p| ProcessDetails {
            binary_name: p.name.clone(),
            binary_path: p.path.clone(),
            window_hidden: p.window_hidden,
            parent_exited: p.parent_exited,
            is_service: p.service,
        }))
    }
}

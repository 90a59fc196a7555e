//! sysinfo-backed Process Source

use parking_lot::Mutex;
use sysinfo::{Pid, System};

use super::sources::ProcessSource;
use super::types::ProcessDetails;
use crate::logic::error::Result;

/// Parent of every Windows service process
const SERVICE_CONTROL_MANAGER: &str = "services.exe";

/// PID -> name/path/parent through `sysinfo`.
///
/// sysinfo has no window information, so `window_hidden` is always false
/// (the weakest reading of that indicator).
pub struct SysinfoProcessSource {
    system: Mutex<System>,
}

impl SysinfoProcessSource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoProcessSource {
    fn name(&self) -> &'static str {
        "sysinfo"
    }

    fn lookup(&self, pid: u32) -> Result<Option<ProcessDetails>> {
        let mut system = self.system.lock();
        let pid = Pid::from_u32(pid);

        if !system.refresh_process(pid) {
            return Ok(None);
        }

        let Some(process) = system.process(pid) else {
            return Ok(None);
        };
        let binary_name = process.name().to_string();
        let binary_path = process
            .exe()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        let parent = process.parent();

        let (parent_exited, is_service) = match parent {
            Some(ppid) if system.refresh_process(ppid) => {
                let parent_name = system.process(ppid).map(|p| p.name().to_lowercase());
                (false, parent_name.as_deref() == Some(SERVICE_CONTROL_MANAGER))
            }
            Some(ppid) => {
                log::debug!("PID {} outlived its parent {}", pid, ppid);
                (true, false)
            }
            None => (false, false),
        };

        Ok(Some(ProcessDetails {
            binary_name,
            binary_path,
            window_hidden: false,
            parent_exited,
            is_service,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_process_resolves() {
        let source = SysinfoProcessSource::new();
        let details = source.lookup(std::process::id()).unwrap().unwrap();
        // the test harness that spawned us is still running
        assert!(!details.parent_exited);
        assert!(!details.is_service);
    }

    #[test]
    fn test_missing_pid_is_race_loss() {
        let source = SysinfoProcessSource::new();
        assert_eq!(source.lookup(u32::MAX - 1).unwrap(), None);
    }
}

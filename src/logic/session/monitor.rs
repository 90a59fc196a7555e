//! Monitoring Loop
//!
//! Dedicated thread running a current-thread tokio runtime. Each iteration
//! runs one full scan cycle, then waits for either the interval or the stop
//! signal. Cancellation is only observed between cycles.
//!
//! The loop holds the session weakly and only upgrades it for the length of
//! one cycle, so dropping the last outside handle also ends monitoring.

use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;

use super::machine::Session;
use super::types::ScanReport;
use crate::logic::error::{DetectorError, Result};

/// Called on the monitor thread after every completed cycle
pub type CycleObserver = Box<dyn Fn(&ScanReport) + Send + 'static>;

pub(super) struct MonitorHandle {
    stop: watch::Sender<bool>,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    pub(super) fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Ask the loop to exit after its current cycle without waiting
    pub(super) fn signal(&self) {
        // receiver already gone means the loop has exited
        let _ = self.stop.send(true);
    }

    /// Signal and wait; an in-flight cycle always completes first.
    /// Called from the monitor thread itself (an observer) it only signals.
    pub(super) fn stop(self) {
        self.signal();
        if self.thread.thread().id() == thread::current().id() {
            log::debug!("Stop requested from the monitor thread; not joining");
            return;
        }
        if self.thread.join().is_err() {
            log::error!("Monitor thread panicked");
        }
    }
}

pub(super) fn spawn(
    session: Weak<Session>,
    interval: Duration,
    observer: Option<CycleObserver>,
) -> Result<MonitorHandle> {
    let (stop_tx, stop_rx) = watch::channel(false);

    let thread = thread::Builder::new()
        .name("keyguard-monitor".to_string())
        .spawn(move || run(session, interval, stop_rx, observer))
        .map_err(|e| DetectorError::MonitorStart(e.to_string()))?;

    Ok(MonitorHandle {
        stop: stop_tx,
        thread,
    })
}

fn run(
    session: Weak<Session>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
    observer: Option<CycleObserver>,
) {
    let rt = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime for monitoring: {}", e);
            return;
        }
    };

    rt.block_on(async move {
        log::info!("Monitoring started (interval {:?})", interval);

        loop {
            if *stop.borrow() {
                break;
            }

            let Some(live) = session.upgrade() else {
                log::debug!("Session dropped; monitor exiting");
                break;
            };
            let result = live.snapshot();
            drop(live);

            match result {
                Ok(report) => {
                    if !report.hooks_added.is_empty() || !report.hooks_removed.is_empty() {
                        log::info!(
                            "Hook changes: +{:?} -{:?}",
                            report.hooks_added,
                            report.hooks_removed
                        );
                    }
                    if let Some(observer) = &observer {
                        observer(&report);
                    }
                }
                Err(DetectorError::SessionTerminated) => break,
                Err(e) => log::warn!("Scan cycle failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Monitoring stopped");
    });
}

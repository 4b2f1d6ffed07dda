//! Orphan detection
//!
//! The tailer is launched by another process and must not outlive it, even if
//! that process is hard-killed and never sends an interrupt. Both checks here
//! are heuristics; a missed detection only delays shutdown to the next poll.

use std::fmt::Debug;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tracing::info;

/// Decides whether the process that launched the tailer is gone
pub trait OrphanCheck: Send + Sync + Debug {
    fn is_orphaned(&self) -> bool;
}

/// Compares the real parent pid with the expected one
///
/// When a parent exits, the OS re-parents its children, so any mismatch means
/// the original parent is gone.
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
pub struct ParentPidCheck {
    expected: u32,
}

#[cfg(unix)]
impl ParentPidCheck {
    pub fn new(expected: u32) -> Self {
        Self { expected }
    }
}

#[cfg(unix)]
impl OrphanCheck for ParentPidCheck {
    fn is_orphaned(&self) -> bool {
        let actual = std::os::unix::process::parent_id();
        if actual != self.expected {
            info!(
                "Parent pid changed from {} to {}, process is orphaned",
                self.expected, actual
            );
            return true;
        }
        false
    }
}

/// Looks the parent up by pid and checks that it is still running
///
/// Used where the OS gives no re-parenting guarantee.
#[derive(Debug, Clone, Copy)]
pub struct ProcessLivenessCheck {
    pid: Pid,
}

impl ProcessLivenessCheck {
    pub fn new(pid: u32) -> Self {
        Self {
            pid: Pid::from_u32(pid),
        }
    }
}

impl OrphanCheck for ProcessLivenessCheck {
    fn is_orphaned(&self) -> bool {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);

        match system.process(self.pid) {
            None => {
                info!("No such process: {}, process is orphaned", self.pid);
                true
            }
            Some(parent) => {
                let status = parent.status();
                if status_means_orphaned(status) {
                    info!("Parent status: {:?}, process is orphaned", status);
                    return true;
                }
                false
            }
        }
    }
}

/// Any status other than running counts as gone
pub fn status_means_orphaned(status: ProcessStatus) -> bool {
    status != ProcessStatus::Run
}

/// The platform's preferred check for the given parent pid
#[cfg(unix)]
pub fn for_parent(pid: u32) -> Box<dyn OrphanCheck> {
    Box::new(ParentPidCheck::new(pid))
}

#[cfg(not(unix))]
pub fn for_parent(pid: u32) -> Box<dyn OrphanCheck> {
    Box::new(ProcessLivenessCheck::new(pid))
}

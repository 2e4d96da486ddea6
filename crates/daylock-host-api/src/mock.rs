//! Mock collaborators for testing

use async_trait::async_trait;
use daylock_api::{Notification, ProcessSnapshot, Severity, TerminateOutcome};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::{
    HostError, HostResult, NotificationSink, ProcessSource, ProcessTerminator,
};

/// In-memory process table doubling as source and terminator.
///
/// A successful termination removes the process from the table, so a
/// subsequent poll no longer sees it. Pids in `deny_pids` report
/// `AccessDenied` and stay running; pids in `vanish_pids` appear in
/// enumeration but report `NoSuchProcess` on terminate, simulating a
/// process that exited between listing and the signal.
#[derive(Clone, Default)]
pub struct MockProcessTable {
    processes: Arc<Mutex<Vec<ProcessSnapshot>>>,
    terminated: Arc<Mutex<Vec<u32>>>,

    /// Pids for which terminate reports AccessDenied
    pub deny_pids: Arc<Mutex<HashSet<u32>>>,

    /// Pids that vanish between enumeration and termination
    pub vanish_pids: Arc<Mutex<HashSet<u32>>>,

    /// Configure enumeration to fail
    pub fail_enumerate: Arc<Mutex<bool>>,
}

impl MockProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, snapshot: ProcessSnapshot) {
        self.processes.lock().unwrap().push(snapshot);
    }

    pub fn deny(&self, pid: u32) {
        self.deny_pids.lock().unwrap().insert(pid);
    }

    pub fn vanish(&self, pid: u32) {
        self.vanish_pids.lock().unwrap().insert(pid);
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.processes.lock().unwrap().iter().any(|p| p.pid == pid)
    }

    pub fn running_pids(&self) -> Vec<u32> {
        self.processes.lock().unwrap().iter().map(|p| p.pid).collect()
    }

    /// Pids that received a successful termination, in order
    pub fn terminated_pids(&self) -> Vec<u32> {
        self.terminated.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessSource for MockProcessTable {
    async fn enumerate(&self) -> HostResult<Vec<ProcessSnapshot>> {
        if *self.fail_enumerate.lock().unwrap() {
            return Err(HostError::EnumerationFailed("mock enumeration failure".into()));
        }
        Ok(self.processes.lock().unwrap().clone())
    }
}

#[async_trait]
impl ProcessTerminator for MockProcessTable {
    async fn terminate(&self, pid: u32) -> HostResult<TerminateOutcome> {
        if self.deny_pids.lock().unwrap().contains(&pid) {
            return Ok(TerminateOutcome::AccessDenied);
        }

        if self.vanish_pids.lock().unwrap().remove(&pid) {
            self.processes.lock().unwrap().retain(|p| p.pid != pid);
            return Ok(TerminateOutcome::NoSuchProcess);
        }

        let mut processes = self.processes.lock().unwrap();
        let before = processes.len();
        processes.retain(|p| p.pid != pid);

        if processes.len() < before {
            self.terminated.lock().unwrap().push(pid);
            Ok(TerminateOutcome::Terminated)
        } else {
            Ok(TerminateOutcome::NoSuchProcess)
        }
    }
}

/// Sink that records notifications for assertions
#[derive(Clone, Default)]
pub struct RecordingSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn messages_with_severity(&self, severity: Severity) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.severity == severity)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, severity: Severity, message: String) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::new(severity, message));
    }
}

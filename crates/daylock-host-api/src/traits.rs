//! Host collaborator traits

use async_trait::async_trait;
use daylock_api::{ProcessSnapshot, Severity, TerminateOutcome};
use thiserror::Error;

/// Errors from host collaborator operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Process enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("Termination failed: {0}")]
    TerminateFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Abstraction over the OS process table.
///
/// Produces a finite snapshot of currently running processes, refreshed
/// on each poll. Implementations must tolerate processes disappearing
/// between listing and inspection: return what is available, omit the
/// rest.
#[async_trait]
pub trait ProcessSource: Send + Sync {
    async fn enumerate(&self) -> HostResult<Vec<ProcessSnapshot>>;
}

/// Requests termination of a process by id.
///
/// Privilege failures and already-exited processes are outcomes, not
/// errors; `Err` is reserved for unexpected host faults.
#[async_trait]
pub trait ProcessTerminator: Send + Sync {
    async fn terminate(&self, pid: u32) -> HostResult<TerminateOutcome>;
}

/// Fire-and-forget sink for user-visible events.
///
/// `notify` must never block the caller; the enforcement loop calls it
/// from inside a poll cycle.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, message: String);
}

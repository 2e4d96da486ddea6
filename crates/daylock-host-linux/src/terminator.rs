//! Signal-based process termination

use async_trait::async_trait;
use daylock_api::TerminateOutcome;
use daylock_host_api::{HostError, HostResult, ProcessTerminator};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::debug;

/// Terminator that delivers SIGTERM to the target process.
///
/// Privilege failures and already-exited targets map onto outcomes so
/// the enforcement loop can handle each per-process; only unexpected
/// errno values surface as errors.
#[derive(Debug, Default)]
pub struct SignalTerminator;

impl SignalTerminator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessTerminator for SignalTerminator {
    async fn terminate(&self, pid: u32) -> HostResult<TerminateOutcome> {
        // kill(0) would signal our own process group
        if pid == 0 {
            return Err(HostError::TerminateFailed("refusing to signal pid 0".into()));
        }

        let target = Pid::from_raw(pid as i32);
        match signal::kill(target, Signal::SIGTERM) {
            Ok(()) => {
                debug!(pid, "Sent SIGTERM");
                Ok(TerminateOutcome::Terminated)
            }
            Err(Errno::ESRCH) => Ok(TerminateOutcome::NoSuchProcess),
            Err(Errno::EPERM) => Ok(TerminateOutcome::AccessDenied),
            Err(e) => Err(HostError::TerminateFailed(format!("kill({pid}): {e}"))),
        }
    }
}

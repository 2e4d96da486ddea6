//! Process enumeration via /proc

use async_trait::async_trait;
use daylock_api::ProcessSnapshot;
use daylock_host_api::{HostError, HostResult, ProcessSource};
use tracing::trace;

/// Process source backed by the procfs crate.
///
/// Entries that disappear or become unreadable mid-walk are omitted, not
/// errors; the exe link is routinely unreadable for other users'
/// processes, so `path` is best-effort.
#[derive(Debug, Default)]
pub struct ProcfsProcessSource;

impl ProcfsProcessSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSource for ProcfsProcessSource {
    async fn enumerate(&self) -> HostResult<Vec<ProcessSnapshot>> {
        let processes = procfs::process::all_processes()
            .map_err(|e| HostError::EnumerationFailed(e.to_string()))?;

        let mut snapshots = Vec::new();
        for proc in processes {
            // Vanished between readdir and open
            let Ok(proc) = proc else { continue };

            let name = match proc.status() {
                Ok(status) => status.name,
                Err(_) => continue,
            };
            let path = proc.exe().ok();

            snapshots.push(ProcessSnapshot::new(proc.pid() as u32, name, path));
        }

        trace!(count = snapshots.len(), "Process table enumerated");
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enumeration_includes_self() {
        let source = ProcfsProcessSource::new();
        let snapshot = source.enumerate().await.unwrap();

        let own_pid = std::process::id();
        let me = snapshot.iter().find(|p| p.pid == own_pid).unwrap();
        assert!(!me.name.is_empty());
        // Our own exe link is always readable
        assert!(me.path.is_some());
    }
}

//! The enforcement loop
//!
//! One dedicated background task polls the process table on a fixed
//! interval, matches processes against the stored rules, and terminates
//! instances whose policy disallows the current weekday. Nothing inside a
//! poll cycle is allowed to stop the loop; only `stop()` does.

use chrono::Weekday;
use daylock_api::{Severity, TerminateOutcome};
use daylock_host_api::{NotificationSink, ProcessSource, ProcessTerminator};
use daylock_store::RuleStore;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Loop lifecycle state, inspected only at cycle boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    Stopped = 0,
    Running = 1,
    Stopping = 2,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => LoopState::Running,
            2 => LoopState::Stopping,
            _ => LoopState::Stopped,
        }
    }
}

/// Tunables for the enforcement loop
#[derive(Debug, Clone)]
pub struct EnforcementConfig {
    /// Time between poll cycles
    pub poll_interval: Duration,

    /// Upper bound on a single termination call. A stuck terminator
    /// forfeits that process for the cycle, not the rest of the sweep.
    pub terminate_timeout: Duration,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            terminate_timeout: Duration::from_secs(5),
        }
    }
}

/// What one poll cycle did. Logged at debug level and returned to tests.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub day: Weekday,
    /// Cycle was abandoned before the sweep (store or enumeration
    /// failure)
    pub skipped: bool,
    pub rules_loaded: usize,
    pub processes_scanned: usize,
    pub matched: usize,
    pub terminated: usize,
    pub access_denied: usize,
}

impl CycleSummary {
    fn new(day: Weekday) -> Self {
        Self {
            day,
            skipped: false,
            rules_loaded: 0,
            processes_scanned: 0,
            matched: 0,
            terminated: 0,
            access_denied: 0,
        }
    }
}

/// The background enforcement engine.
///
/// `start()` spawns the poll task; `stop()` asks it to exit at the next
/// cycle boundary and waits for it. Both are idempotent.
pub struct EnforcementLoop {
    inner: Arc<LoopInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct LoopInner {
    store: Arc<dyn RuleStore>,
    source: Arc<dyn ProcessSource>,
    terminator: Arc<dyn ProcessTerminator>,
    sink: Arc<dyn NotificationSink>,
    config: EnforcementConfig,
    state: AtomicU8,
    stop_notify: Notify,
}

impl EnforcementLoop {
    pub fn new(
        store: Arc<dyn RuleStore>,
        source: Arc<dyn ProcessSource>,
        terminator: Arc<dyn ProcessTerminator>,
        sink: Arc<dyn NotificationSink>,
        config: EnforcementConfig,
    ) -> Self {
        Self {
            inner: Arc::new(LoopInner {
                store,
                source,
                terminator,
                sink,
                config,
                state: AtomicU8::new(LoopState::Stopped as u8),
                stop_notify: Notify::new(),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> LoopState {
        self.inner.state()
    }

    /// Transition Stopped -> Running and spawn the poll task. No-op when
    /// already Running (no duplicate loop) or still draining a `stop()`.
    pub fn start(&self) {
        let swapped = self.inner.state.compare_exchange(
            LoopState::Stopped as u8,
            LoopState::Running as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        if swapped.is_err() {
            debug!("Enforcement loop already running, start ignored");
            return;
        }

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            run(inner).await;
        });

        *self.task.lock().unwrap() = Some(handle);
    }

    /// Transition Running -> Stopping and wait for the task to finish its
    /// current cycle and exit. No-op when already Stopped.
    pub async fn stop(&self) {
        let swapped = self.inner.state.compare_exchange(
            LoopState::Running as u8,
            LoopState::Stopping as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        if swapped.is_ok() {
            info!("Enforcement loop stop requested");
        }
        self.inner.stop_notify.notify_waiters();

        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Execute a single poll cycle against the given weekday. The
    /// background task calls this once per interval with the wall-clock
    /// weekday; exposing it lets hosts and tests drive one cycle
    /// directly.
    pub async fn run_cycle(&self, today: Weekday) -> CycleSummary {
        self.inner.run_cycle(today).await
    }
}

async fn run(inner: Arc<LoopInner>) {
    info!(
        interval_ms = inner.config.poll_interval.as_millis() as u64,
        "Enforcement loop started"
    );

    let mut ticker = tokio::time::interval(inner.config.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        if inner.state() != LoopState::Running {
            break;
        }

        // Wake on stop so a long interval does not delay shutdown. The
        // state is re-checked after waking either way.
        let stopped = inner.stop_notify.notified();
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stopped => {}
        }

        if inner.state() != LoopState::Running {
            break;
        }

        let today = daylock_util::current_weekday();
        let summary = inner.run_cycle(today).await;
        debug!(
            day = daylock_util::weekday_name(summary.day),
            skipped = summary.skipped,
            rules = summary.rules_loaded,
            scanned = summary.processes_scanned,
            matched = summary.matched,
            terminated = summary.terminated,
            access_denied = summary.access_denied,
            "Poll cycle complete"
        );
    }

    inner.set_state(LoopState::Stopped);
    info!("Enforcement loop stopped");
}

impl LoopInner {
    fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: LoopState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    async fn run_cycle(&self, today: Weekday) -> CycleSummary {
        let mut summary = CycleSummary::new(today);

        let rules = match self.store.list_rules() {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "Rule store unavailable, skipping cycle");
                self.sink.notify(
                    Severity::Warning,
                    format!("Rule store unavailable, enforcement skipped this cycle: {e}"),
                );
                summary.skipped = true;
                return summary;
            }
        };
        summary.rules_loaded = rules.len();

        if rules.is_empty() {
            return summary;
        }

        let processes = match self.source.enumerate().await {
            Ok(processes) => processes,
            Err(e) => {
                warn!(error = %e, "Process enumeration failed, skipping cycle");
                self.sink.notify(
                    Severity::Warning,
                    format!("Process enumeration failed, enforcement skipped this cycle: {e}"),
                );
                summary.skipped = true;
                return summary;
            }
        };
        summary.processes_scanned = processes.len();

        for process in &processes {
            let Some(rule) = crate::find_rule(process, &rules) else {
                continue;
            };
            summary.matched += 1;

            if crate::is_allowed_today(rule, today) {
                continue;
            }

            debug!(
                pid = process.pid,
                name = %process.name,
                rule = %rule.identity,
                "Restricted process detected"
            );

            let outcome = tokio::time::timeout(
                self.config.terminate_timeout,
                self.terminator.terminate(process.pid),
            )
            .await;

            match outcome {
                Ok(Ok(TerminateOutcome::Terminated)) => {
                    summary.terminated += 1;
                    info!(
                        pid = process.pid,
                        name = %rule.display_name,
                        day = daylock_util::weekday_name(today),
                        "Restricted process terminated"
                    );
                    self.sink.notify(
                        Severity::Info,
                        format!(
                            "{} is not allowed to run on {} and was closed",
                            rule.display_name,
                            daylock_util::weekday_name(today)
                        ),
                    );
                }
                Ok(Ok(TerminateOutcome::AccessDenied)) => {
                    summary.access_denied += 1;
                    warn!(pid = process.pid, name = %rule.display_name, "Access denied");
                    self.sink.notify(
                        Severity::Error,
                        format!(
                            "Access denied terminating {} (pid {}). Run daylock with elevated privileges.",
                            rule.display_name, process.pid
                        ),
                    );
                }
                Ok(Ok(TerminateOutcome::NoSuchProcess)) => {
                    // Process exited between enumeration and the signal.
                    debug!(pid = process.pid, "Process already gone");
                }
                Ok(Err(e)) => {
                    warn!(pid = process.pid, error = %e, "Termination failed");
                    self.sink.notify(
                        Severity::Warning,
                        format!(
                            "Failed to terminate {} (pid {}): {e}",
                            rule.display_name, process.pid
                        ),
                    );
                }
                Err(_) => {
                    warn!(
                        pid = process.pid,
                        timeout_ms = self.config.terminate_timeout.as_millis() as u64,
                        "Termination timed out"
                    );
                    self.sink.notify(
                        Severity::Warning,
                        format!(
                            "Termination of {} (pid {}) timed out",
                            rule.display_name, process.pid
                        ),
                    );
                }
            }
        }

        summary
    }
}

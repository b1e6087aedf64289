//! One-shot background task bridge.
//!
//! Every long-running operation (connecting, table listing, previewing,
//! transferring) runs as a task: a unit of background work that runs to
//! completion or failure exactly once and reports exactly one
//! [`TaskOutcome`] back to the caller over a oneshot channel. The caller's
//! own loop never blocks; it awaits the outcome notification.
//!
//! Two tasks of the same kind must not run concurrently. Each kind owns a
//! [`TaskGate`] whose permit is held for the task's whole lifetime and
//! released when the outcome has been emitted.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

/// The single result of a task. Either the success payload or a
/// human-readable failure message; never both, never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Succeeded(T),
    Failed(String),
}

impl<T> TaskOutcome<T> {
    /// Build a failure outcome, substituting a fallback for empty messages
    /// so a failure always carries a diagnostic.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            TaskOutcome::Failed("task failed".to_string())
        } else {
            TaskOutcome::Failed(message)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded(_))
    }

    /// Convert back into a `Result`, wrapping failure text in
    /// [`BridgeError::TaskFailed`].
    pub fn into_result(self) -> Result<T> {
        match self {
            TaskOutcome::Succeeded(value) => Ok(value),
            TaskOutcome::Failed(message) => Err(BridgeError::TaskFailed(message)),
        }
    }
}

impl<T> From<Result<T>> for TaskOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => TaskOutcome::Succeeded(value),
            Err(e) => TaskOutcome::failed(e.to_string()),
        }
    }
}

/// Receiver side of a spawned task. Consuming it yields the task's single
/// outcome.
pub struct TaskHandle<T> {
    kind: &'static str,
    rx: oneshot::Receiver<TaskOutcome<T>>,
}

impl<T> TaskHandle<T> {
    /// Await the task's outcome. A worker that dies without reporting
    /// (panic, runtime shutdown) still yields a `Failed` outcome.
    pub async fn outcome(self) -> TaskOutcome<T> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => TaskOutcome::failed(format!(
                "{} task aborted before reporting an outcome",
                self.kind
            )),
        }
    }
}

/// Per-task-kind permit preventing two tasks of the same kind from running
/// concurrently. The gate stays closed until the in-flight task has
/// emitted its outcome.
#[derive(Debug, Clone, Default)]
pub struct TaskGate {
    running: Arc<AtomicBool>,
}

impl TaskGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to open the gate. Returns `None` while a permit is outstanding.
    pub fn try_acquire(&self) -> Option<TaskPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TaskPermit {
                running: Arc::clone(&self.running),
            })
    }

    /// Whether a task holding this gate is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of a running task; reopens the gate on drop.
pub struct TaskPermit {
    running: Arc<AtomicBool>,
}

impl Drop for TaskPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Spawn an async task of the given kind. Fails immediately with
/// [`BridgeError::TaskInFlight`] when the gate is closed.
pub fn spawn<T, F>(kind: &'static str, gate: &TaskGate, fut: F) -> Result<TaskHandle<T>>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let permit = gate
        .try_acquire()
        .ok_or(BridgeError::TaskInFlight(kind))?;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        debug!("{} task started", kind);
        let outcome = match fut.await {
            Ok(value) => TaskOutcome::Succeeded(value),
            Err(e) => TaskOutcome::failed(e.to_string()),
        };
        // Reopen the gate before notifying, so a caller reacting to the
        // outcome can immediately start the next task of this kind.
        drop(permit);
        if tx.send(outcome).is_err() {
            warn!("{} task outcome dropped: receiver went away", kind);
        }
    });

    Ok(TaskHandle { kind, rx })
}

/// Spawn a blocking task of the given kind on the blocking thread pool.
/// A panicking worker is converted into a `Failed` outcome.
pub fn spawn_blocking<T, F>(kind: &'static str, gate: &TaskGate, f: F) -> Result<TaskHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let permit = gate
        .try_acquire()
        .ok_or(BridgeError::TaskInFlight(kind))?;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        debug!("{} task started (blocking)", kind);
        let outcome = match tokio::task::spawn_blocking(f).await {
            Ok(Ok(value)) => TaskOutcome::Succeeded(value),
            Ok(Err(e)) => TaskOutcome::failed(e.to_string()),
            Err(join_err) => TaskOutcome::failed(format!("{} task panicked: {}", kind, join_err)),
        };
        drop(permit);
        if tx.send(outcome).is_err() {
            warn!("{} task outcome dropped: receiver went away", kind);
        }
    });

    Ok(TaskHandle { kind, rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_outcome() {
        let gate = TaskGate::new();
        let handle = spawn("unit", &gate, async { Ok(41 + 1) }).unwrap();
        assert_eq!(handle.outcome().await, TaskOutcome::Succeeded(42));
    }

    #[tokio::test]
    async fn test_failure_carries_message() {
        let gate = TaskGate::new();
        let handle = spawn::<(), _>("unit", &gate, async {
            Err(BridgeError::Config("bad input".into()))
        })
        .unwrap();

        match handle.outcome().await {
            TaskOutcome::Failed(message) => {
                assert!(!message.is_empty());
                assert!(message.contains("bad input"));
            }
            TaskOutcome::Succeeded(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_gate_rejects_concurrent_same_kind_task() {
        let gate = TaskGate::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = spawn("unit", &gate, async move {
            let _ = release_rx.await;
            Ok(())
        })
        .unwrap();

        let second = spawn("unit", &gate, async { Ok(()) });
        assert!(matches!(second, Err(BridgeError::TaskInFlight("unit"))));
        assert!(gate.is_running());

        release_tx.send(()).unwrap();
        assert!(first.outcome().await.is_success());
    }

    #[tokio::test]
    async fn test_gate_reopens_after_outcome() {
        let gate = TaskGate::new();

        let first = spawn("unit", &gate, async { Ok(1) }).unwrap();
        assert_eq!(first.outcome().await, TaskOutcome::Succeeded(1));

        // The permit is released once the outcome has been emitted.
        let second = spawn("unit", &gate, async { Ok(2) }).unwrap();
        assert_eq!(second.outcome().await, TaskOutcome::Succeeded(2));
        assert!(!gate.is_running());
    }

    #[tokio::test]
    async fn test_panicking_blocking_task_yields_failure() {
        let gate = TaskGate::new();
        let handle =
            spawn_blocking::<(), _>("unit", &gate, || panic!("worker exploded")).unwrap();

        match handle.outcome().await {
            TaskOutcome::Failed(message) => assert!(message.contains("panicked")),
            TaskOutcome::Succeeded(_) => panic!("expected failure"),
        }

        // Gate must reopen even after a panic.
        assert!(spawn_blocking("unit", &gate, || Ok(())).is_ok());
    }

    #[tokio::test]
    async fn test_blocking_success() {
        let gate = TaskGate::new();
        let handle = spawn_blocking("unit", &gate, || Ok("done".to_string())).unwrap();
        assert_eq!(
            handle.outcome().await,
            TaskOutcome::Succeeded("done".to_string())
        );
    }

    #[test]
    fn test_failed_outcome_never_empty() {
        let outcome: TaskOutcome<()> = TaskOutcome::failed("");
        assert_eq!(outcome, TaskOutcome::Failed("task failed".to_string()));
    }
}

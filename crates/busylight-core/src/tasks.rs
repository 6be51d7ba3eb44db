//! Named background tasks attached to a light.
//!
//! Each light owns a [`TaskRegistry`] mapping task names to running tokio
//! tasks. At most one task per name runs at a time unless a replacement is
//! requested. A separate observer task watches every spawned task and logs
//! how it ended; failures never reach the code that started the task.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error};

use crate::error::{LightResult, TaskError};

/// Scheduling priority used to cancel groups of tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TaskPriority {
    Low = 1,
    Normal = 2,
    High = 3,
    Critical = 4,
}

impl TaskPriority {
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How far a task has got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Cancelled,
    Failed(String),
}

/// A cancellable unit of background work.
pub trait ManagedTask: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Request cancellation. Cancelling a finished task is a no-op.
    ///
    /// # Errors
    ///
    /// [`TaskError::CancelFailed`] when the request could not be delivered.
    fn cancel(&self) -> Result<(), TaskError>;

    fn state(&self) -> TaskState;

    fn is_finished(&self) -> bool;
}

/// A future running on a tokio runtime.
pub struct SpawnedTask {
    name: String,
    abort: AbortHandle,
    state: Arc<Mutex<TaskState>>,
}

impl fmt::Debug for SpawnedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedTask")
            .field("name", &self.name)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl SpawnedTask {
    /// Spawn `future` on `runtime` with a completion observer.
    pub fn spawn<F>(
        runtime: &Handle,
        name: impl Into<String>,
        priority: TaskPriority,
        created_at: SystemTime,
        future: F,
    ) -> Self
    where
        F: Future<Output = LightResult<()>> + Send + 'static,
    {
        let name = name.into();
        let state = Arc::new(Mutex::new(TaskState::Running));
        let handle = runtime.spawn(future);
        let abort = handle.abort_handle();
        runtime.spawn(observe(
            name.clone(),
            priority,
            created_at,
            handle,
            Arc::clone(&state),
        ));
        Self { name, abort, state }
    }
}

async fn observe(
    name: String,
    priority: TaskPriority,
    created_at: SystemTime,
    handle: JoinHandle<LightResult<()>>,
    state: Arc<Mutex<TaskState>>,
) {
    let outcome = match handle.await {
        Ok(Ok(())) => {
            debug!("Task '{name}' completed successfully");
            TaskState::Completed
        }
        Ok(Err(e)) => {
            error!("Task '{name}' failed with exception: {e}");
            error!("Task priority: {priority}, created at: {created_at:?}");
            TaskState::Failed(e.to_string())
        }
        Err(e) if e.is_cancelled() => {
            debug!("Task '{name}' was cancelled");
            TaskState::Cancelled
        }
        Err(e) => {
            error!("Task '{name}' panicked: {e}");
            TaskState::Failed(e.to_string())
        }
    };
    *state.lock() = outcome;
}

impl ManagedTask for SpawnedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn cancel(&self) -> Result<(), TaskError> {
        self.abort.abort();
        let mut state = self.state.lock();
        if *state == TaskState::Running {
            *state = TaskState::Cancelled;
        }
        Ok(())
    }

    fn state(&self) -> TaskState {
        self.state.lock().clone()
    }

    fn is_finished(&self) -> bool {
        self.abort.is_finished() || *self.state.lock() != TaskState::Running
    }
}

/// Point-in-time view of one tracked task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub name: String,
    pub running: bool,
    pub cancelled: bool,
    pub has_exception: bool,
    pub exception: Option<String>,
    pub priority: TaskPriority,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone)]
struct TaskEntry {
    task: Arc<dyn ManagedTask>,
    priority: TaskPriority,
    created_at: SystemTime,
}

impl TaskEntry {
    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Tasks owned by one light, keyed by name.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: Mutex<BTreeMap<String, TaskEntry>>,
    runtime: Option<Handle>,
}

impl TaskRegistry {
    /// Empty registry that spawns onto the caller's tokio runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn onto `runtime` instead of the ambient one.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            entries: Mutex::default(),
            runtime: Some(runtime),
        }
    }

    fn runtime(&self, name: &str) -> Result<Handle, TaskError> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|e| {
                debug!("No runtime for task '{name}': {e}");
                TaskError::NoRuntime(name.to_string())
            }),
        }
    }

    /// Start the task `name` unless it is already running.
    ///
    /// `make` builds the future and is only called when a new task is
    /// actually spawned, so its validation errors surface here before
    /// anything is scheduled. With `replace` set, a running task of the
    /// same name is cancelled and dropped first.
    ///
    /// # Errors
    ///
    /// Whatever `make` returns, or [`TaskError::NoRuntime`] outside a tokio
    /// runtime.
    pub fn add_task<F, Fut>(
        &self,
        name: &str,
        priority: TaskPriority,
        replace: bool,
        make: F,
    ) -> LightResult<Arc<dyn ManagedTask>>
    where
        F: FnOnce() -> LightResult<Fut>,
        Fut: Future<Output = LightResult<()>> + Send + 'static,
    {
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.is_running());

        if let Some(existing) = entries.get(name) {
            if !replace {
                debug!("Task '{name}' already exists, returning existing");
                return Ok(Arc::clone(&existing.task));
            }
            debug!("Replacing existing task '{name}'");
            if let Err(e) = existing.task.cancel() {
                debug!("Ignoring cancel failure while replacing '{name}': {e}");
            }
            entries.remove(name);
        }

        let runtime = self.runtime(name)?;
        let future = make()?;
        let created_at = SystemTime::now();
        let task: Arc<dyn ManagedTask> = Arc::new(SpawnedTask::spawn(
            &runtime, name, priority, created_at, future,
        ));
        entries.insert(
            name.to_string(),
            TaskEntry {
                task: Arc::clone(&task),
                priority,
                created_at,
            },
        );
        debug!("Created task '{name}' with priority {priority}");
        Ok(task)
    }

    /// Track an externally created task under `name`, replacing any entry.
    pub fn track(&self, name: &str, task: Arc<dyn ManagedTask>, priority: TaskPriority) {
        self.entries.lock().insert(
            name.to_string(),
            TaskEntry {
                task,
                priority,
                created_at: SystemTime::now(),
            },
        );
    }

    /// Cancel and forget the task `name`.
    ///
    /// The entry is removed before cancellation is attempted. Returns the
    /// cancelled task, or `None` when no such task exists or its cancel
    /// request failed. Never errors.
    pub fn cancel_task(&self, name: &str) -> Option<Arc<dyn ManagedTask>> {
        let entry = self.entries.lock().remove(name)?;
        match entry.task.cancel() {
            Ok(()) => {
                debug!("Cancelled task '{name}'");
                Some(entry.task)
            }
            Err(e) => {
                debug!("Task '{name}' could not be cancelled: {e}");
                None
            }
        }
    }

    /// Cancel every task, or only running tasks at `priority`.
    ///
    /// Without a priority the first cancel failure is returned immediately
    /// and the registry is left as it was. With a priority individual
    /// failures are ignored and finished entries are pruned afterwards.
    ///
    /// # Errors
    ///
    /// The first [`TaskError`] raised while cancelling every task.
    pub fn cancel_tasks(&self, priority: Option<TaskPriority>) -> Result<usize, TaskError> {
        let mut entries = self.entries.lock();
        let mut cancelled = 0usize;
        match priority {
            None => {
                for entry in entries.values() {
                    entry.task.cancel()?;
                    cancelled = cancelled.saturating_add(1);
                }
                entries.clear();
                debug!("Cancelled all {cancelled} tasks");
            }
            Some(priority) => {
                for entry in entries.values() {
                    if entry.priority == priority
                        && entry.is_running()
                        && entry.task.cancel().is_ok()
                    {
                        cancelled = cancelled.saturating_add(1);
                    }
                }
                entries.retain(|_, entry| entry.is_running());
                debug!("Cancelled {cancelled} tasks with priority {priority}");
            }
        }
        Ok(cancelled)
    }

    pub fn get_task_status(&self, name: &str) -> Option<TaskStatus> {
        let entries = self.entries.lock();
        let entry = entries.get(name)?;
        let state = entry.task.state();
        let exception = match &state {
            TaskState::Failed(reason) => Some(reason.clone()),
            _ => None,
        };
        Some(TaskStatus {
            name: name.to_string(),
            running: entry.is_running(),
            cancelled: state == TaskState::Cancelled,
            has_exception: exception.is_some(),
            exception,
            priority: entry.priority,
            created_at: entry.created_at,
        })
    }

    /// Names of running tasks, sorted.
    pub fn list_active_tasks(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.is_running())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether an entry named `name` is tracked, even if it has finished.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    /// Number of tracked entries, finished or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

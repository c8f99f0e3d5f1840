use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinSet;

/// Detached work that must finish before the process goes away.
///
/// Tasks run on the runtime captured at construction, not on whichever
/// worker spawned them, so they survive the worker that served the request.
/// Call [`BackgroundTasks::flush`] before teardown.
#[derive(Clone)]
pub struct BackgroundTasks {
    handle: Handle,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundTasks {
    /// Bind to the current tokio runtime
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Start a task without waiting for it
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock();
        // Reap what has already finished so the set stays small
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                tracing::warn!("Background task failed: {}", e);
            }
        }
        tasks.spawn_on(task, &self.handle);
    }

    /// Number of tasks not yet reaped
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Wait for every task spawned so far
    pub async fn flush(&self) {
        let mut tasks = std::mem::take(&mut *self.lock());
        let count = tasks.len();

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Background task failed: {}", e);
            }
        }

        if count > 0 {
            tracing::debug!("Flushed {} background tasks", count);
        }
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

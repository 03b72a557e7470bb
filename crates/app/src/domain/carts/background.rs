//! Bounded background work for cache maintenance.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::timeout;
use tokio_util::task::TaskTracker;
use tracing::{Instrument as _, debug, warn};

/// Default deadline for a single background task.
pub const DEFAULT_BACKGROUND_TIMEOUT: Duration = Duration::from_secs(5);

/// Detached tasks that must not delay or fail the request that scheduled them.
///
/// Each task runs under its own deadline, independent of the caller's. The
/// set of in-flight tasks is tracked so it can be awaited, either by tests
/// or during shutdown.
#[derive(Debug, Clone)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
    deadline: Duration,
}

impl BackgroundTasks {
    #[must_use]
    pub fn new(deadline: Duration) -> Self {
        Self {
            tracker: TaskTracker::new(),
            deadline,
        }
    }

    /// Run `task` in the background. Errors and timeouts are logged and dropped.
    pub fn spawn<F, E>(&self, name: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let deadline = self.deadline;
        let span = tracing::debug_span!("cart.background", task = name);

        self.tracker.spawn(
            async move {
                match timeout(deadline, task).await {
                    Ok(Ok(())) => debug!("background task completed"),
                    Ok(Err(error)) => warn!("background task failed: {error}"),
                    Err(_elapsed) => warn!(
                        deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                        "background task timed out"
                    ),
                }
            }
            .instrument(span),
        );
    }

    /// Number of tasks still running.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Wait until every task spawned so far has finished, then keep accepting
    /// new ones.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Stop tracking new work and wait up to `grace` for in-flight tasks.
    ///
    /// Returns `false` if tasks were still running when `grace` elapsed.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();

        timeout(grace, self.tracker.wait()).await.is_ok()
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND_TIMEOUT)
    }
}

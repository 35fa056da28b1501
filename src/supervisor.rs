use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::WidgetError;

struct Tracked {
    name: String,
    handle: JoinHandle<Result<(), WidgetError>>,
}

/// Owns every widget task so they can be watched and torn down together.
pub struct Supervisor {
    root: CancellationToken,
    tasks: Vec<Tracked>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Token cancelled when the supervisor shuts down.
    pub fn token(&self) -> CancellationToken {
        self.root.child_token()
    }

    pub fn track(&mut self, name: impl Into<String>, handle: JoinHandle<Result<(), WidgetError>>) {
        let name = name.into();
        debug!(widget = %name, "Tracking widget task");
        self.tasks.push(Tracked { name, handle });
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Reap finished tasks and return the first failure, if any.
    ///
    /// Tasks that ended cleanly (such as a log tail that could not locate its
    /// file) are dropped silently.
    pub async fn poll_failure(&mut self) -> Option<WidgetError> {
        let mut failure = None;
        let mut running = Vec::with_capacity(self.tasks.len());

        for tracked in self.tasks.drain(..) {
            if !tracked.handle.is_finished() {
                running.push(tracked);
                continue;
            }

            let result = match tracked.handle.await {
                Ok(result) => result,
                Err(e) => Err(WidgetError::Aborted {
                    widget: tracked.name.clone(),
                    reason: e.to_string(),
                }),
            };

            match result {
                Ok(()) => debug!(widget = %tracked.name, "Widget task finished"),
                Err(e) => {
                    error!(widget = %tracked.name, error = %e, "Widget task failed");
                    failure.get_or_insert(e);
                }
            }
        }

        self.tasks = running;
        failure
    }

    /// Cancel every task and wait for all of them to stop.
    pub async fn shutdown(self) {
        self.root.cancel();
        for tracked in self.tasks {
            if let Err(e) = tracked.handle.await {
                error!(widget = %tracked.name, error = %e, "Widget task did not stop cleanly");
            }
        }
        debug!("All widget tasks stopped");
    }
}

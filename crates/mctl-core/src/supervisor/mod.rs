//! Restart decisions as a second stage behind the driver.
//!
//! The driver forwards failure-terminal tasks over a channel and the supervisor answers
//! with a [`Decision`] per failure. The driver stays the only writer of its tracked set.
use tokio::sync::mpsc;
use tracing::{debug, info};

use mctl_model::{RestartPolicy, TaskId, TaskStatus};

/// A tracked task reached a failure-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub task: TaskId,
    /// One of `Failed`, `Lost` or `Error`.
    pub status: TaskStatus,
    /// Attempt that failed, starting at 0.
    pub attempt: u32,
}

/// What the supervisor wants done with a failed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Submit the same descriptor again.
    Resubmit(TaskId),
    /// Leave the task failed.
    Release(TaskId),
}

impl Decision {
    pub fn task(&self) -> TaskId {
        match self {
            Decision::Resubmit(id) | Decision::Release(id) => *id,
        }
    }
}

/// Applies a [`RestartPolicy`] to failures.
///
/// There is no retry ceiling: with `OnFailure` a task is resubmitted for as long as it keeps failing.
#[derive(Debug, Clone, Copy)]
pub struct RestartSupervisor {
    policy: RestartPolicy,
}

/// Driver side of a running supervisor.
pub struct SupervisorHandle {
    failures: mpsc::UnboundedSender<Failure>,
    decisions: mpsc::UnboundedReceiver<Decision>,
}

impl RestartSupervisor {
    pub fn new(policy: RestartPolicy) -> Self {
        Self { policy }
    }

    /// Pure policy check, also used by the spawned loop.
    pub fn decide(&self, failure: &Failure) -> Decision {
        if self.policy.should_restart(failure.status) {
            Decision::Resubmit(failure.task)
        } else {
            Decision::Release(failure.task)
        }
    }

    /// Start the supervisor loop on the current runtime.
    ///
    /// The loop ends when the handle is dropped.
    pub fn spawn(self) -> SupervisorHandle {
        let (failures, mut inbox) = mpsc::unbounded_channel::<Failure>();
        let (outbox, decisions) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(failure) = inbox.recv().await {
                let decision = self.decide(&failure);
                match decision {
                    Decision::Resubmit(_) => info!(
                        task = %failure.task,
                        attempt = failure.attempt,
                        status = %failure.status,
                        "restarting failed task"
                    ),
                    Decision::Release(_) => debug!(task = %failure.task, "no restart"),
                }
                if outbox.send(decision).is_err() {
                    break;
                }
            }
        });

        SupervisorHandle {
            failures,
            decisions,
        }
    }
}

impl SupervisorHandle {
    /// Hand a failure to the supervisor. Returns `false` if the supervisor is gone.
    pub fn report(&self, failure: Failure) -> bool {
        self.failures.send(failure).is_ok()
    }

    /// Next decision; `None` once the supervisor stopped.
    pub async fn next(&mut self) -> Option<Decision> {
        self.decisions.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(status: TaskStatus) -> Failure {
        Failure {
            task: TaskId::generate(),
            status,
            attempt: 0,
        }
    }

    #[test]
    fn never_releases_everything() {
        let sup = RestartSupervisor::new(RestartPolicy::Never);
        let f = failure(TaskStatus::Failed);
        assert_eq!(sup.decide(&f), Decision::Release(f.task));
    }

    #[test]
    fn on_failure_resubmits_failure_statuses_only() {
        let sup = RestartSupervisor::new(RestartPolicy::OnFailure);
        for status in [TaskStatus::Failed, TaskStatus::Lost, TaskStatus::Error] {
            let f = failure(status);
            assert_eq!(sup.decide(&f), Decision::Resubmit(f.task));
        }
        for status in [TaskStatus::Finished, TaskStatus::Killed] {
            let f = failure(status);
            assert_eq!(sup.decide(&f), Decision::Release(f.task));
        }
    }

    #[tokio::test]
    async fn spawned_loop_answers_in_order() {
        let mut handle = RestartSupervisor::new(RestartPolicy::OnFailure).spawn();
        let a = failure(TaskStatus::Failed);
        let b = failure(TaskStatus::Killed);
        assert!(handle.report(a));
        assert!(handle.report(b));
        assert_eq!(handle.next().await, Some(Decision::Resubmit(a.task)));
        assert_eq!(handle.next().await, Some(Decision::Release(b.task)));
    }
}

//! Scheduler driver: register, submit a batch, track it to completion.
//!
//! ```text
//! Disconnected -> Registering -> Registered -> Submitting -> Tracking -> Done
//!                      \______________\______________\___________\-> Faulted
//! ```
mod event;
mod tracked;

pub use event::DriverEvent;
pub use tracked::{Applied, Tracked, TrackedSet};

use std::{collections::HashMap, fmt, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use mctl_model::{RestartPolicy, TaskDescriptor, TaskId};

use crate::{
    config::FrameworkConfig,
    error::{CoreError, TransportError},
    reporter::Report,
    supervisor::{Decision, Failure, RestartSupervisor, SupervisorHandle},
    transport::{EventStream, ManagerEvent, StatusUpdate, Transport},
};

/// Manager-side id of one submission: `{descriptor id}.{attempt}`.
pub fn manager_task_id(task: &TaskId, attempt: u32) -> String {
    format!("{task}.{attempt}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Disconnected,
    Registering,
    Registered,
    Submitting,
    Tracking,
    Done,
    Faulted,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriverState::Disconnected => "disconnected",
            DriverState::Registering => "registering",
            DriverState::Registered => "registered",
            DriverState::Submitting => "submitting",
            DriverState::Tracking => "tracking",
            DriverState::Done => "done",
            DriverState::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

/// How a run that did not fault ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOutcome {
    /// Every tracked task reached a terminal status.
    Done,
    /// The operator aborted; tracked tasks were asked to die.
    Interrupted,
}

/// How a single submission attempt settled.
enum Launched {
    /// Submitted or rejected; either way the batch goes on.
    Settled,
    /// The interrupt arrived first. Carries the manager id of the abandoned submission.
    Cancelled(String),
    Fatal(TransportError),
}

/// Tasks waiting on a restart decision.
type Parked = HashMap<TaskId, (TaskDescriptor, u32)>;

/// Single-run scheduler driver over a [`Transport`].
pub struct SchedulerDriver {
    transport: Arc<dyn Transport>,
    framework: FrameworkConfig,
    restart: RestartPolicy,
    state: DriverState,
}

impl SchedulerDriver {
    pub fn new(transport: Arc<dyn Transport>, framework: FrameworkConfig) -> Self {
        Self {
            transport,
            framework,
            restart: RestartPolicy::Never,
            state: DriverState::Disconnected,
        }
    }

    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    fn set_state(&mut self, next: DriverState) {
        debug!(from = %self.state, to = %next, "driver state");
        self.state = next;
    }

    fn fault(&mut self, e: TransportError) -> CoreError {
        error!(error = %e, state = %self.state, "transport fault");
        self.set_state(DriverState::Faulted);
        CoreError::Transport(e)
    }

    /// Run `tasks` to completion, reporting every event to `reporter`.
    ///
    /// Cancelling `cancel` kills every tracked task, tears the session down and
    /// returns [`DriverOutcome::Interrupted`].
    #[instrument(level = "debug", skip_all, fields(transport = self.transport.name(), tasks = tasks.len()))]
    pub async fn run<R: Report>(
        &mut self,
        tasks: Vec<TaskDescriptor>,
        reporter: &mut R,
        cancel: CancellationToken,
    ) -> Result<DriverOutcome, CoreError> {
        if tasks.is_empty() {
            self.set_state(DriverState::Done);
            return Ok(DriverOutcome::Done);
        }

        self.set_state(DriverState::Registering);
        let registered = tokio::select! {
            _ = cancel.cancelled() => {
                self.set_state(DriverState::Done);
                return Ok(DriverOutcome::Interrupted);
            }
            r = self.transport.register(&self.framework) => r,
        };
        let mut events = match registered {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "registration failed");
                self.set_state(DriverState::Faulted);
                return Err(CoreError::Registration(e));
            }
        };
        self.set_state(DriverState::Registered);

        self.set_state(DriverState::Submitting);
        let mut tracked = TrackedSet::default();
        for task in tasks {
            match self.launch_or_cancel(task, 0, &mut tracked, reporter, &cancel).await {
                Launched::Settled => {}
                Launched::Cancelled(in_flight) => {
                    return self.interrupt(&tracked, Some(in_flight)).await;
                }
                Launched::Fatal(e) => return Err(self.fault(e)),
            }
        }

        self.set_state(DriverState::Tracking);
        self.track(&mut events, tracked, reporter, cancel).await
    }

    async fn track<R: Report>(
        &mut self,
        events: &mut EventStream,
        mut tracked: TrackedSet,
        reporter: &mut R,
        cancel: CancellationToken,
    ) -> Result<DriverOutcome, CoreError> {
        let mut supervisor = RestartSupervisor::new(self.restart).spawn();
        let mut parked = Parked::new();

        while !tracked.is_empty() || !parked.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.interrupt(&tracked, None).await,
                Some(decision) = supervisor.next(), if !parked.is_empty() => {
                    let Some((task, attempt)) = parked.remove(&decision.task()) else {
                        continue;
                    };
                    if let Decision::Resubmit(id) = decision {
                        let attempt = attempt + 1;
                        reporter.report(&DriverEvent::Restarting { task: id, attempt });
                        match self.launch_or_cancel(task, attempt, &mut tracked, reporter, &cancel).await {
                            Launched::Settled => {}
                            Launched::Cancelled(in_flight) => {
                                return self.interrupt(&tracked, Some(in_flight)).await;
                            }
                            Launched::Fatal(e) => return Err(self.fault(e)),
                        }
                    }
                }
                event = events.recv() => match event {
                    Some(ManagerEvent::Update(update)) => {
                        if let Err(e) = self
                            .on_update(&update, &mut tracked, &mut parked, &supervisor, reporter)
                            .await
                        {
                            return Err(self.fault(e));
                        }
                    }
                    Some(ManagerEvent::Error(msg)) => {
                        return Err(self.fault(TransportError::Manager(msg)));
                    }
                    Some(ManagerEvent::Disconnected(msg)) => {
                        return Err(self.fault(TransportError::Disconnected(msg)));
                    }
                    None => {
                        return Err(self.fault(TransportError::Disconnected("event stream dropped".into())));
                    }
                },
            }
        }

        self.set_state(DriverState::Done);
        if let Err(e) = self.transport.teardown().await {
            warn!(error = %e, "teardown failed");
        }
        Ok(DriverOutcome::Done)
    }

    /// [`Self::launch`] unless `cancel` fires first.
    ///
    /// A submission can wait on the manager indefinitely, so it must not outlive an interrupt.
    async fn launch_or_cancel<R: Report>(
        &self,
        task: TaskDescriptor,
        attempt: u32,
        tracked: &mut TrackedSet,
        reporter: &mut R,
        cancel: &CancellationToken,
    ) -> Launched {
        let manager_id = manager_task_id(&task.id, attempt);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            r = self.launch(task, attempt, tracked, reporter) => Some(r),
        };
        match result {
            None => Launched::Cancelled(manager_id),
            Some(Ok(())) => Launched::Settled,
            Some(Err(e)) => Launched::Fatal(e),
        }
    }

    /// Submit one attempt. Only fatal transport errors are returned.
    async fn launch<R: Report>(
        &self,
        task: TaskDescriptor,
        attempt: u32,
        tracked: &mut TrackedSet,
        reporter: &mut R,
    ) -> Result<(), TransportError> {
        let manager_id = manager_task_id(&task.id, attempt);
        match self.transport.submit(&manager_id, &task).await {
            Ok(()) => {
                info!(task = %task.id, attempt, %manager_id, "task submitted");
                reporter.report(&DriverEvent::Submitted {
                    task: task.id,
                    name: task.name.clone(),
                    manager_id: manager_id.clone(),
                    attempt,
                });
                tracked.insert(manager_id, task, attempt);
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                warn!(task = %task.id, attempt, error = %e, "submission rejected");
                reporter.report(&DriverEvent::Rejected {
                    task: task.id,
                    manager_id,
                    reason: e.to_string(),
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn on_update<R: Report>(
        &self,
        update: &StatusUpdate,
        tracked: &mut TrackedSet,
        parked: &mut Parked,
        supervisor: &SupervisorHandle,
        reporter: &mut R,
    ) -> Result<(), TransportError> {
        let task = tracked.get(&update.manager_id).map(|t| t.task.id);
        match (task, tracked.apply(update)) {
            (_, Applied::Unknown) | (None, _) => {
                debug!(manager_id = %update.manager_id, status = %update.status, "update for unknown launch");
            }
            (Some(_), Applied::Stale) => {
                debug!(manager_id = %update.manager_id, status = %update.status, "stale update dropped");
            }
            (Some(id), Applied::Transition) => {
                reporter.report(&status_event(id, update));
            }
            (Some(id), Applied::Terminal(done)) => {
                reporter.report(&status_event(id, update));
                if update.status.is_failure() {
                    warn!(task = %id, attempt = done.attempt, status = %update.status, "task failed");
                    let failure = Failure {
                        task: id,
                        status: update.status,
                        attempt: done.attempt,
                    };
                    if supervisor.report(failure) {
                        parked.insert(id, (done.task, done.attempt));
                    }
                }
            }
        }

        match self.transport.acknowledge(update).await {
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(manager_id = %update.manager_id, error = %e, "acknowledge rejected");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Best-effort kill of every tracked launch, then teardown.
    ///
    /// `in_flight` is a submission cut short by the interrupt. The manager may still have
    /// started it, so it is killed too.
    async fn interrupt(
        &mut self,
        tracked: &TrackedSet,
        in_flight: Option<String>,
    ) -> Result<DriverOutcome, CoreError> {
        info!(tracked = tracked.len(), in_flight = ?in_flight, "interrupted, killing tracked tasks");
        let targets = tracked
            .iter()
            .map(|(manager_id, t)| (manager_id, t.agent_id.as_deref()))
            .chain(in_flight.as_deref().map(|manager_id| (manager_id, None)));
        for (manager_id, agent_id) in targets {
            if let Err(e) = self.transport.kill(manager_id, agent_id).await {
                warn!(%manager_id, error = %e, "kill failed");
            }
        }
        if let Err(e) = self.transport.teardown().await {
            warn!(error = %e, "teardown failed");
        }
        self.set_state(DriverState::Done);
        Ok(DriverOutcome::Interrupted)
    }
}

fn status_event(task: TaskId, update: &StatusUpdate) -> DriverEvent {
    DriverEvent::Status {
        task,
        manager_id: update.manager_id.clone(),
        status: update.status,
        message: update.message.clone(),
    }
}

//! Operator-facing status lines and the process exit code.
use std::{collections::HashMap, io::Write};

use tracing::warn;

use mctl_model::{TaskId, TaskStatus};

use crate::driver::DriverEvent;

/// Exit code when every task finished.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for anything else.
pub const EXIT_FAILURE: i32 = 1;

/// Sink for driver events.
pub trait Report {
    fn report(&mut self, event: &DriverEvent);
}

/// Writes one line per event and keeps the last terminal status of every task.
pub struct StatusReporter<W: Write> {
    out: W,
    names: HashMap<TaskId, String>,
    /// `None` while a task has no terminal status, or is being restarted.
    finals: HashMap<TaskId, Option<TaskStatus>>,
}

impl<W: Write> StatusReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            names: HashMap::new(),
            finals: HashMap::new(),
        }
    }

    /// Final status of a task, if it has one.
    pub fn final_status(&self, task: &TaskId) -> Option<TaskStatus> {
        self.finals.get(task).copied().flatten()
    }

    /// `0` when every task that was seen finished, `1` otherwise.
    ///
    /// A task without a terminal status counts as a failure.
    pub fn exit_code(&self) -> i32 {
        let all_finished = self
            .finals
            .values()
            .all(|s| matches!(s, Some(TaskStatus::Finished)));
        if all_finished {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }

    /// Give back the writer, for instance to inspect captured output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn label(&self, task: &TaskId) -> String {
        match self.names.get(task) {
            Some(name) => format!("{name} [{task}]"),
            None => format!("[{task}]"),
        }
    }

    fn line(&mut self, line: String) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!(error = %e, "failed to write status line");
        }
    }
}

impl<W: Write> Report for StatusReporter<W> {
    fn report(&mut self, event: &DriverEvent) {
        let task = event.task();
        let line = match event {
            DriverEvent::Submitted {
                name,
                manager_id,
                attempt,
                ..
            } => {
                self.names.insert(task, name.clone());
                self.finals.entry(task).or_insert(None);
                format!("{} submitted as {manager_id} (attempt {attempt})", self.label(&task))
            }
            DriverEvent::Rejected {
                manager_id, reason, ..
            } => {
                self.finals.insert(task, Some(TaskStatus::Error));
                format!("{} {manager_id} rejected: {reason}", self.label(&task))
            }
            DriverEvent::Status {
                manager_id,
                status,
                message,
                ..
            } => {
                if status.is_terminal() {
                    self.finals.insert(task, Some(*status));
                }
                match message {
                    Some(msg) => format!("{} {manager_id} {status}: {msg}", self.label(&task)),
                    None => format!("{} {manager_id} {status}", self.label(&task)),
                }
            }
            DriverEvent::Restarting { attempt, .. } => {
                self.finals.insert(task, None);
                format!("{} restarting (attempt {attempt})", self.label(&task))
            }
        };
        self.line(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(task: TaskId) -> DriverEvent {
        DriverEvent::Submitted {
            task,
            name: "web".into(),
            manager_id: format!("{task}.0"),
            attempt: 0,
        }
    }

    fn status(task: TaskId, status: TaskStatus) -> DriverEvent {
        DriverEvent::Status {
            task,
            manager_id: format!("{task}.0"),
            status,
            message: None,
        }
    }

    #[test]
    fn finished_run_exits_zero() {
        let id = TaskId::generate();
        let mut r = StatusReporter::new(Vec::new());
        for ev in [
            submitted(id),
            status(id, TaskStatus::Staging),
            status(id, TaskStatus::Running),
            status(id, TaskStatus::Finished),
        ] {
            r.report(&ev);
        }
        assert_eq!(r.exit_code(), EXIT_SUCCESS);
        assert_eq!(r.final_status(&id), Some(TaskStatus::Finished));

        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().next().unwrap().starts_with("web ["));
        assert!(out.ends_with("finished\n"));
    }

    #[test]
    fn any_other_final_status_exits_one() {
        for bad in [
            TaskStatus::Failed,
            TaskStatus::Killed,
            TaskStatus::Lost,
            TaskStatus::Error,
        ] {
            let (a, b) = (TaskId::generate(), TaskId::generate());
            let mut r = StatusReporter::new(std::io::sink());
            r.report(&submitted(a));
            r.report(&submitted(b));
            r.report(&status(a, TaskStatus::Finished));
            r.report(&status(b, bad));
            assert_eq!(r.exit_code(), EXIT_FAILURE, "{bad}");
        }
    }

    #[test]
    fn rejection_and_pending_count_as_failure() {
        let id = TaskId::generate();
        let mut r = StatusReporter::new(std::io::sink());
        r.report(&DriverEvent::Rejected {
            task: id,
            manager_id: format!("{id}.0"),
            reason: "no".into(),
        });
        assert_eq!(r.final_status(&id), Some(TaskStatus::Error));
        assert_eq!(r.exit_code(), EXIT_FAILURE);

        let mut r = StatusReporter::new(std::io::sink());
        r.report(&submitted(id));
        r.report(&status(id, TaskStatus::Running));
        assert_eq!(r.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn restart_clears_previous_failure() {
        let id = TaskId::generate();
        let mut r = StatusReporter::new(std::io::sink());
        r.report(&submitted(id));
        r.report(&status(id, TaskStatus::Failed));
        r.report(&DriverEvent::Restarting { task: id, attempt: 1 });
        assert_eq!(r.final_status(&id), None);
        r.report(&status(id, TaskStatus::Finished));
        assert_eq!(r.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn empty_run_exits_zero() {
        assert_eq!(StatusReporter::new(std::io::sink()).exit_code(), EXIT_SUCCESS);
    }
}

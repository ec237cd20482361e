use mctl_model::{TaskId, TaskStatus};

/// Something the operator should see, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// The manager accepted a launch.
    Submitted {
        task: TaskId,
        name: String,
        manager_id: String,
        attempt: u32,
    },
    /// The manager refused a launch. Final status is [`TaskStatus::Error`].
    Rejected {
        task: TaskId,
        manager_id: String,
        reason: String,
    },
    Status {
        task: TaskId,
        manager_id: String,
        status: TaskStatus,
        message: Option<String>,
    },
    /// A failed task is about to be submitted again.
    Restarting { task: TaskId, attempt: u32 },
}

impl DriverEvent {
    pub fn task(&self) -> TaskId {
        match self {
            DriverEvent::Submitted { task, .. }
            | DriverEvent::Rejected { task, .. }
            | DriverEvent::Status { task, .. }
            | DriverEvent::Restarting { task, .. } => *task,
        }
    }
}

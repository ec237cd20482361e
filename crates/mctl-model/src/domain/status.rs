use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a launched task as reported by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
    Error,
}

impl TaskStatus {
    /// No further transition follows a terminal status.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            TaskStatus::Staging | TaskStatus::Starting | TaskStatus::Running
        )
    }

    /// Terminal statuses eligible for a restart.
    ///
    /// `Killed` is excluded: it is an operator-initiated stop.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TaskStatus::Failed | TaskStatus::Lost | TaskStatus::Error
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Staging => "staging",
            TaskStatus::Starting => "starting",
            TaskStatus::Running => "running",
            TaskStatus::Finished => "finished",
            TaskStatus::Failed => "failed",
            TaskStatus::Killed => "killed",
            TaskStatus::Lost => "lost",
            TaskStatus::Error => "error",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

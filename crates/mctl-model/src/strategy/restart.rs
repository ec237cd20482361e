use serde::{Deserialize, Serialize};

use crate::TaskStatus;

/// Whether a task is resubmitted after it reaches a terminal status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestartPolicy {
    /// Every terminal status is final.
    #[default]
    Never,
    /// Resubmit after `Failed`, `Lost` or `Error`, with no attempt ceiling.
    OnFailure,
}

impl RestartPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, RestartPolicy::OnFailure)
    }

    /// Decide whether a task that just reached `status` goes back to the manager.
    pub fn should_restart(&self, status: TaskStatus) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::OnFailure => status.is_failure(),
        }
    }
}

impl From<bool> for RestartPolicy {
    fn from(restart: bool) -> Self {
        if restart {
            RestartPolicy::OnFailure
        } else {
            RestartPolicy::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_restarts_nothing() {
        for status in [TaskStatus::Failed, TaskStatus::Lost, TaskStatus::Finished] {
            assert!(!RestartPolicy::Never.should_restart(status));
        }
    }

    #[test]
    fn on_failure_skips_finished_and_killed() {
        let p = RestartPolicy::OnFailure;
        assert!(p.should_restart(TaskStatus::Failed));
        assert!(p.should_restart(TaskStatus::Lost));
        assert!(p.should_restart(TaskStatus::Error));
        assert!(!p.should_restart(TaskStatus::Finished));
        assert!(!p.should_restart(TaskStatus::Killed));
        assert!(!p.should_restart(TaskStatus::Running));
    }

    #[test]
    fn restart_flag_selects_on_failure() {
        assert_eq!(RestartPolicy::from(true), RestartPolicy::OnFailure);
        assert_eq!(RestartPolicy::from(false), RestartPolicy::Never);
        assert!(!RestartPolicy::default().is_enabled());
    }
}

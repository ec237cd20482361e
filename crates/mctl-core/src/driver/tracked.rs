use std::collections::HashMap;

use mctl_model::{TaskDescriptor, TaskStatus};

use crate::transport::StatusUpdate;

/// One live launch of a descriptor.
#[derive(Debug, Clone)]
pub struct Tracked {
    /// Descriptor as submitted; resubmissions reuse it unchanged.
    pub task: TaskDescriptor,
    /// Zero for the first submission, bumped by each restart.
    pub attempt: u32,
    /// Last applied status, `None` until the manager reports one.
    pub status: Option<TaskStatus>,
    /// Agent running the launch, once known. KILL is addressed to it.
    pub agent_id: Option<String>,
    last_timestamp: Option<f64>,
}

/// Result of applying an update to the tracked set.
#[derive(Debug)]
pub enum Applied {
    /// Not a launch of this run.
    Unknown,
    /// Older than what was already applied for that launch.
    Stale,
    /// Non-terminal status applied.
    Transition,
    /// Terminal status; the launch left the set.
    Terminal(Tracked),
}

/// Live launches keyed by manager id.
#[derive(Debug, Default)]
pub struct TrackedSet {
    launches: HashMap<String, Tracked>,
}

impl TrackedSet {
    /// Start tracking a submission. Replaces any launch with the same manager id.
    pub fn insert(&mut self, manager_id: String, task: TaskDescriptor, attempt: u32) {
        self.launches.insert(
            manager_id,
            Tracked {
                task,
                attempt,
                status: None,
                agent_id: None,
                last_timestamp: None,
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.launches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.launches.len()
    }

    /// Launch submitted under `manager_id`, if still live.
    pub fn get(&self, manager_id: &str) -> Option<&Tracked> {
        self.launches.get(manager_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tracked)> {
        self.launches.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// Apply one update. Updates for the same launch carrying an older timestamp are dropped.
    pub fn apply(&mut self, update: &StatusUpdate) -> Applied {
        let Some(entry) = self.launches.get_mut(&update.manager_id) else {
            return Applied::Unknown;
        };
        if let (Some(seen), Some(at)) = (entry.last_timestamp, update.timestamp) {
            if at < seen {
                return Applied::Stale;
            }
        }

        entry.status = Some(update.status);
        if update.timestamp.is_some() {
            entry.last_timestamp = update.timestamp;
        }
        if update.agent_id.is_some() {
            entry.agent_id.clone_from(&update.agent_id);
        }

        if update.status.is_terminal() {
            match self.launches.remove(&update.manager_id) {
                Some(done) => Applied::Terminal(done),
                None => Applied::Unknown,
            }
        } else {
            Applied::Transition
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_model::{CommandSpec, Resources, TaskId};

    fn set_with(manager_id: &str) -> TrackedSet {
        let mut set = TrackedSet::default();
        let task = TaskDescriptor {
            id: TaskId::generate(),
            name: "t".into(),
            resources: Resources::default(),
            command: CommandSpec::new("true"),
            container: None,
        };
        set.insert(manager_id.to_string(), task, 0);
        set
    }

    fn at(manager_id: &str, status: TaskStatus, ts: f64) -> StatusUpdate {
        StatusUpdate {
            timestamp: Some(ts),
            agent_id: Some("agent-1".into()),
            ..StatusUpdate::new(manager_id, status)
        }
    }

    #[test]
    fn terminal_status_removes_launch() {
        let mut set = set_with("a.0");
        assert!(matches!(set.apply(&at("a.0", TaskStatus::Running, 1.0)), Applied::Transition));
        assert_eq!(set.get("a.0").unwrap().agent_id.as_deref(), Some("agent-1"));

        match set.apply(&at("a.0", TaskStatus::Finished, 2.0)) {
            Applied::Terminal(t) => assert_eq!(t.status, Some(TaskStatus::Finished)),
            other => panic!("expected terminal, got {other:?}"),
        }
        assert!(set.is_empty());
    }

    #[test]
    fn older_update_is_stale() {
        let mut set = set_with("a.0");
        set.apply(&at("a.0", TaskStatus::Running, 5.0));
        assert!(matches!(set.apply(&at("a.0", TaskStatus::Staging, 4.0)), Applied::Stale));
        assert_eq!(set.get("a.0").unwrap().status, Some(TaskStatus::Running));
    }

    #[test]
    fn unknown_launch_is_reported() {
        let mut set = set_with("a.0");
        assert!(matches!(set.apply(&at("b.0", TaskStatus::Running, 1.0)), Applied::Unknown));
        assert_eq!(set.len(), 1);
    }
}

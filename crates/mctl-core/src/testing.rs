//! Scripted in-memory [`Transport`] for driver tests.
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use mctl_model::{CommandSpec, Resources, TaskDescriptor, TaskId, TaskStatus};

use crate::{
    config::FrameworkConfig,
    error::TransportError,
    transport::{EventStream, ManagerEvent, StatusUpdate, Transport},
};

/// What happens to one submission, in submit order.
#[derive(Debug, Clone)]
pub enum Script {
    /// Accept, then emit these statuses.
    Statuses(Vec<TaskStatus>),
    /// Refuse the launch.
    Reject(String),
    /// Accept, then drop the session.
    Disconnect,
    /// Never settle, like a launch waiting for an offer that does not come.
    Stall,
}

#[derive(Default)]
struct State {
    scripts: VecDeque<Script>,
    events: Option<mpsc::UnboundedSender<ManagerEvent>>,
    calls: Vec<String>,
    clock: f64,
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<State>>,
    refuse_register: Option<String>,
}

impl ScriptedTransport {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        let state = State {
            scripts: scripts.into_iter().collect(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            refuse_register: None,
        }
    }

    pub fn refusing_registration(reason: &str) -> Self {
        Self {
            refuse_register: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Every call made so far, such as `submit <id>` or `ack <id> running`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn register(&self, _framework: &FrameworkConfig) -> Result<EventStream, TransportError> {
        self.record("register".into());
        if let Some(reason) = &self.refuse_register {
            return Err(TransportError::Rejected(reason.clone()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().unwrap().events = Some(tx);
        Ok(rx)
    }

    async fn submit(&self, manager_id: &str, _task: &TaskDescriptor) -> Result<(), TransportError> {
        self.record(format!("submit {manager_id}"));
        let script = self
            .state
            .lock()
            .unwrap()
            .scripts
            .pop_front()
            .unwrap_or(Script::Statuses(vec![TaskStatus::Finished]));
        if let Script::Stall = script {
            return std::future::pending().await;
        }

        let mut state = self.state.lock().unwrap();
        let tx = state.events.clone().ok_or(TransportError::NotRegistered)?;
        match script {
            Script::Stall => unreachable!("handled above"),
            Script::Reject(reason) => Err(TransportError::Rejected(reason)),
            Script::Disconnect => {
                let _ = tx.send(ManagerEvent::Disconnected("scripted drop".into()));
                Ok(())
            }
            Script::Statuses(statuses) => {
                for status in statuses {
                    state.clock += 1.0;
                    let update = StatusUpdate {
                        timestamp: Some(state.clock),
                        agent_id: Some("agent-1".into()),
                        ack: Some(format!("ack-{}", state.clock)),
                        ..StatusUpdate::new(manager_id, status)
                    };
                    let _ = tx.send(ManagerEvent::Update(update));
                }
                Ok(())
            }
        }
    }

    async fn acknowledge(&self, update: &StatusUpdate) -> Result<(), TransportError> {
        self.record(format!("ack {} {}", update.manager_id, update.status));
        Ok(())
    }

    async fn kill(&self, manager_id: &str, _agent_id: Option<&str>) -> Result<(), TransportError> {
        self.record(format!("kill {manager_id}"));
        Ok(())
    }

    async fn teardown(&self) -> Result<(), TransportError> {
        self.record("teardown".into());
        Ok(())
    }
}

pub fn descriptor(name: &str) -> TaskDescriptor {
    TaskDescriptor {
        id: TaskId::generate(),
        name: name.to_string(),
        resources: Resources::default(),
        command: CommandSpec::new("true"),
        container: None,
    }
}

//! Seam between the driver and the manager.
//!
//! A [`Transport`] registers a framework session, launches descriptors and
//! delivers status updates on an ordered event channel.
//! Capacity matching (offers) stays behind this trait.
use async_trait::async_trait;
use tokio::sync::mpsc;

use mctl_model::{TaskDescriptor, TaskStatus};

use crate::{config::FrameworkConfig, error::TransportError};

/// One status transition reported by the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// Manager-side id of the launch this update belongs to.
    pub manager_id: String,
    pub status: TaskStatus,
    pub message: Option<String>,
    /// Seconds since the epoch, as stamped by the manager.
    pub timestamp: Option<f64>,
    pub agent_id: Option<String>,
    /// Acknowledgement token; `None` when the update needs no acknowledgement.
    pub ack: Option<String>,
}

impl StatusUpdate {
    pub fn new(manager_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            manager_id: manager_id.into(),
            status,
            message: None,
            timestamp: None,
            agent_id: None,
            ack: None,
        }
    }
}

/// Event delivered by a registered session.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    Update(StatusUpdate),
    /// The manager terminated the session with an error.
    Error(String),
    /// The event stream ended or broke.
    Disconnected(String),
}

pub type EventStream = mpsc::UnboundedReceiver<ManagerEvent>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name used in logs.
    fn name(&self) -> &'static str;

    /// Open a session and wait until the manager acknowledges the registration.
    async fn register(&self, framework: &FrameworkConfig) -> Result<EventStream, TransportError>;

    /// Launch `task` under `manager_id` and wait until the manager accepted it.
    ///
    /// [`TransportError::Rejected`] concerns this launch only.
    async fn submit(&self, manager_id: &str, task: &TaskDescriptor) -> Result<(), TransportError>;

    /// Acknowledge an applied update.
    async fn acknowledge(&self, update: &StatusUpdate) -> Result<(), TransportError>;

    /// Ask the manager to kill a launch.
    async fn kill(&self, manager_id: &str, agent_id: Option<&str>) -> Result<(), TransportError>;

    /// Close the session and release the framework.
    async fn teardown(&self) -> Result<(), TransportError>;
}

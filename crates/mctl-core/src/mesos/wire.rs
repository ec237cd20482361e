//! JSON shapes of the Mesos v1 scheduler API.
//!
//! Only the fields this client reads or writes are modeled.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id {
    pub value: String,
}

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

// ---- calls ----

#[derive(Debug, Serialize)]
pub struct Call {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_id: Option<Id>,
    #[serde(flatten)]
    pub body: CallBody,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallBody {
    Subscribe { subscribe: Subscribe },
    Accept { accept: Accept },
    Decline { decline: Decline },
    Revive,
    Acknowledge { acknowledge: Acknowledge },
    Kill { kill: Kill },
    Teardown,
}

impl CallBody {
    pub fn kind(&self) -> &'static str {
        match self {
            CallBody::Subscribe { .. } => "SUBSCRIBE",
            CallBody::Accept { .. } => "ACCEPT",
            CallBody::Decline { .. } => "DECLINE",
            CallBody::Revive => "REVIVE",
            CallBody::Acknowledge { .. } => "ACKNOWLEDGE",
            CallBody::Kill { .. } => "KILL",
            CallBody::Teardown => "TEARDOWN",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Subscribe {
    pub framework_info: FrameworkInfo,
}

#[derive(Debug, Serialize)]
pub struct FrameworkInfo {
    pub user: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover_timeout: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Filters {
    pub refuse_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct Accept {
    pub offer_ids: Vec<Id>,
    pub operations: Vec<Operation>,
    pub filters: Filters,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Launch { launch: Launch },
}

#[derive(Debug, Serialize)]
pub struct Launch {
    pub task_infos: Vec<TaskInfo>,
}

#[derive(Debug, Serialize)]
pub struct Decline {
    pub offer_ids: Vec<Id>,
    pub filters: Filters,
}

#[derive(Debug, Serialize)]
pub struct Acknowledge {
    pub agent_id: Id,
    pub task_id: Id,
    pub uuid: String,
}

#[derive(Debug, Serialize)]
pub struct Kill {
    pub task_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<Id>,
}

// ---- task info ----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskInfo {
    pub name: String,
    pub task_id: Id,
    pub agent_id: Id,
    pub resources: Vec<Resource>,
    pub command: CommandInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub scalar: Scalar,
}

impl Resource {
    pub fn scalar(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: "SCALAR",
            scalar: Scalar { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scalar {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandInfo {
    pub shell: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerInfo {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeInfo {
    pub host_path: String,
    pub container_path: String,
    pub mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockerInfo {
    pub image: String,
    pub network: &'static str,
    pub privileged: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMappingInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortMappingInfo {
    pub host_port: u32,
    pub container_port: u32,
    pub protocol: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub key: String,
    pub value: String,
}

// ---- events ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Subscribed,
    Offers,
    Rescind,
    Update,
    Message,
    Failure,
    Error,
    Heartbeat,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub subscribed: Option<Subscribed>,
    #[serde(default)]
    pub offers: Option<Offers>,
    #[serde(default)]
    pub rescind: Option<Rescind>,
    #[serde(default)]
    pub update: Option<Update>,
    #[serde(default)]
    pub failure: Option<Failure>,
    #[serde(default)]
    pub error: Option<ErrorEvent>,
}

#[derive(Debug, Deserialize)]
pub struct Subscribed {
    pub framework_id: Id,
    #[serde(default)]
    pub heartbeat_interval_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Offers {
    #[serde(default)]
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Offer {
    pub id: Id,
    pub agent_id: Id,
    #[serde(default)]
    pub hostname: String,
}

#[derive(Debug, Deserialize)]
pub struct Rescind {
    pub offer_id: Id,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub status: Status,
}

#[derive(Debug, Deserialize)]
pub struct Status {
    pub task_id: Id,
    pub state: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub agent_id: Option<Id>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Present when the update must be acknowledged.
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub agent_id: Option<Id>,
    #[serde(default)]
    pub status: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
}

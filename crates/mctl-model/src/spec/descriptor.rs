use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    CommandSpec, Resources, TaskId,
    error::{ModelError, ModelResult},
    spec::Container,
};

/// How a command line is started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Passed verbatim to `/bin/sh -c`.
    Shell(String),
    /// Split on whitespace; the first word is the program.
    Exec(Vec<String>),
}

impl Invocation {
    fn of(command: &CommandSpec) -> Option<Self> {
        if !command.has_value() {
            return None;
        }
        Some(if command.shell.is_enabled() {
            Invocation::Shell(command.value.clone())
        } else {
            Invocation::Exec(command.value.split_whitespace().map(String::from).collect())
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Shell(script) => write!(f, "sh -c {script:?}"),
            Invocation::Exec(argv) => f.write_str(&argv.join(" ")),
        }
    }
}

/// Runtime entry point of a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entrypoint {
    /// Bare process on the agent.
    Process(Invocation),
    /// Container image, optionally overriding its command.
    Image {
        image: String,
        command: Option<Invocation>,
    },
}

impl fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entrypoint::Process(inv) => write!(f, "{inv}"),
            Entrypoint::Image {
                image,
                command: Some(inv),
            } => write!(f, "{image}: {inv}"),
            Entrypoint::Image {
                image,
                command: None,
            } => f.write_str(image),
        }
    }
}

/// Immutable compiled unit of work submitted to the manager.
///
/// This is also the `--json` dump format: a dump loaded back yields equal descriptors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    /// Build-time identity, kept across resubmissions.
    pub id: TaskId,
    /// Human-readable task name shown by the manager.
    pub name: String,
    pub resources: Resources,
    pub command: CommandSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
}

impl TaskDescriptor {
    pub fn is_containerized(&self) -> bool {
        matches!(self.container, Some(Container::Docker { .. }))
    }

    /// Resolve the entry point, checking the shape invariants.
    pub fn entrypoint(&self) -> ModelResult<Entrypoint> {
        let invocation = Invocation::of(&self.command);
        match (&self.container, invocation) {
            (Some(Container::Docker { image, .. }), command) => {
                if image.trim().is_empty() {
                    return Err(ModelError::MissingImage);
                }
                Ok(Entrypoint::Image {
                    image: image.clone(),
                    command,
                })
            }
            (_, Some(inv)) => Ok(Entrypoint::Process(inv)),
            (_, None) => Err(ModelError::MissingCommand),
        }
    }

    /// Validate a descriptor built elsewhere (for instance loaded from a file).
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Invalid("task name is empty".into()));
        }
        self.resources.validate()?;
        self.entrypoint().map(|_| ())
    }
}

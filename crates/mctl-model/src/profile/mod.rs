//! Run profile: the accumulated run options, compiled into task descriptors.
//!
//! A [`Profile`] is assembled step by step through builder methods that consume and return it.
//! Every [`Profile::task`] call yields an independent descriptor snapshot.
mod builder;
pub use builder::{DescriptorBuilder, TaskOverrides};

use crate::{
    CommandSpec, ContainerSpec, RestartPolicy, TaskDescriptor, error::ModelResult,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    master: String,
    restart: RestartPolicy,
    command: CommandSpec,
    container: ContainerSpec,
}

impl Profile {
    /// Empty profile: leader discovery, no restart, no command and no container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager address. Empty means "discover the leader".
    pub fn with_master(mut self, master: impl Into<String>) -> Self {
        self.master = master.into();
        self
    }

    /// What happens to tasks that end in a failure status.
    pub fn with_restart(mut self, restart: impl Into<RestartPolicy>) -> Self {
        self.restart = restart.into();
        self
    }

    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.command = command;
        self
    }

    pub fn with_container(mut self, container: ContainerSpec) -> Self {
        self.container = container;
        self
    }

    /// Manager address as given; may be empty.
    pub fn master(&self) -> &str {
        &self.master
    }

    /// Restart policy the driver applies to every task of the batch.
    pub fn restart(&self) -> RestartPolicy {
        self.restart
    }

    /// Process settings shared by every descriptor.
    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Container settings before materialization.
    pub fn container(&self) -> &ContainerSpec {
        &self.container
    }

    /// Compile one descriptor from this profile.
    pub fn task(&self, overrides: TaskOverrides) -> ModelResult<TaskDescriptor> {
        DescriptorBuilder::build(self, overrides)
    }
}

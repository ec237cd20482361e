use crate::{
    DEFAULT_TASK_NAME, Resources, TaskDescriptor, TaskId,
    error::{ModelError, ModelResult},
    profile::Profile,
};

/// Per-descriptor inputs that do not come from the profile.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskOverrides {
    pub id: TaskId,
    pub name: String,
    pub resources: Resources,
}

impl TaskOverrides {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            name: DEFAULT_TASK_NAME.to_string(),
            resources: Resources::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }
}

/// Compiles a [`Profile`] into a [`TaskDescriptor`].
///
/// Pure and deterministic: the same profile and overrides always produce the same descriptor,
/// so a `--json` dump is exactly what would have been submitted.
pub struct DescriptorBuilder;

impl DescriptorBuilder {
    pub fn build(profile: &Profile, overrides: TaskOverrides) -> ModelResult<TaskDescriptor> {
        let command = profile.command();
        let container = profile.container();

        if !command.has_value() && container.image.trim().is_empty() {
            return Err(ModelError::MissingEntrypoint);
        }
        if container.enabled.is_enabled() && container.image.trim().is_empty() {
            return Err(ModelError::MissingImage);
        }
        if container.enabled.is_disabled() && !command.has_value() {
            return Err(ModelError::MissingCommand);
        }
        if overrides.name.trim().is_empty() {
            return Err(ModelError::Invalid("task name is empty".into()));
        }
        overrides.resources.validate()?;

        Ok(TaskDescriptor {
            id: overrides.id,
            name: overrides.name,
            resources: overrides.resources,
            command: command.clone(),
            container: container.materialize(),
        })
    }
}

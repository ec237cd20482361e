use serde::{Deserialize, Serialize};

use crate::{DEFAULT_USER, Env, Flag};

/// Command half of a task: what runs, as whom, with which environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Command line. May be empty for a container that uses its image entrypoint.
    #[serde(default)]
    pub value: String,
    pub user: String,
    /// Run `value` through `/bin/sh -c` instead of executing it directly.
    #[serde(default)]
    pub shell: Flag,
    #[serde(default, skip_serializing_if = "Env::is_empty")]
    pub env: Env,
}

impl CommandSpec {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

impl Default for CommandSpec {
    fn default() -> Self {
        Self {
            value: String::new(),
            user: DEFAULT_USER.to_string(),
            shell: Flag::disabled(),
            env: Env::new(),
        }
    }
}

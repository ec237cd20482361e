use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Docker network mode understood by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NetworkMode {
    Host,
    #[default]
    Bridge,
    None,
    User,
}

impl NetworkMode {
    pub const ALL: [NetworkMode; 4] = [
        NetworkMode::Host,
        NetworkMode::Bridge,
        NetworkMode::None,
        NetworkMode::User,
    ];

    /// Canonical manager-side name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::Host => "HOST",
            NetworkMode::Bridge => "BRIDGE",
            NetworkMode::None => "NONE",
            NetworkMode::User => "USER",
        }
    }
}

impl FromStr for NetworkMode {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == upper)
            .ok_or_else(|| ValidationError::InvalidNetworkMode(s.to_string()))
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

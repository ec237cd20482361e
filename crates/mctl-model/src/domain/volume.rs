use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Access mode of a mounted volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VolumeMode {
    #[default]
    #[serde(rename = "RO")]
    ReadOnly,
    #[serde(rename = "RW")]
    ReadWrite,
}

impl VolumeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeMode::ReadOnly => "RO",
            VolumeMode::ReadWrite => "RW",
        }
    }
}

impl fmt::Display for VolumeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host path mounted into the task sandbox, `HOST:CONTAINER[:MODE]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub host_path: String,
    pub container_path: String,
    #[serde(default)]
    pub mode: VolumeMode,
}

impl Volume {
    pub fn new<H, C>(host_path: H, container_path: C, mode: VolumeMode) -> Self
    where
        H: Into<String>,
        C: Into<String>,
    {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            mode,
        }
    }
}

impl FromStr for Volume {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ValidationError::InvalidVolume(s.to_string());

        let segments: Vec<&str> = s.split(':').collect();
        let mode = match segments.as_slice() {
            [_, _] => VolumeMode::ReadOnly,
            [_, _, mode] => match mode.to_ascii_uppercase().as_str() {
                "RO" => VolumeMode::ReadOnly,
                "RW" => VolumeMode::ReadWrite,
                _ => return Err(bad()),
            },
            _ => return Err(bad()),
        };
        Ok(Self::new(segments[0], segments[1], mode))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.host_path, self.container_path, self.mode
        )
    }
}

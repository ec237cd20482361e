use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Split `KEY=VALUE` on its single `=`.
///
/// Returns `None` unless there is exactly one `=` and the key is non-empty.
/// The value may be empty.
pub(crate) fn split_pair(raw: &str) -> Option<(&str, &str)> {
    let mut parts = raw.split('=');
    let key = parts.next()?;
    let value = parts.next()?;
    if parts.next().is_some() || key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Environment variable passed to the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    name: String,
    value: String,
}

impl EnvVar {
    /// Build a variable without validating the name.
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Variable name, never empty when parsed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable value; may be empty.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for EnvVar {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        split_pair(s)
            .map(|(name, value)| Self::new(name, value))
            .ok_or_else(|| ValidationError::InvalidEnvVar(s.to_string()))
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl From<(&str, &str)> for EnvVar {
    fn from((name, value): (&str, &str)) -> Self {
        Self::new(name, value)
    }
}

/// Freeform parameter handed to the container runtime untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    key: String,
    value: String,
}

impl Parameter {
    /// Build a parameter from an option name and its value.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Runtime option name, such as `memory` or `ulimit`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Runtime option value, passed through verbatim.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Parameter {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        split_pair(s)
            .map(|(key, value)| Self::new(key, value))
            .ok_or_else(|| ValidationError::InvalidParameter(s.to_string()))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

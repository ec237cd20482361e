use serde::{Deserialize, Serialize};

use crate::EnvVar;

/// Environment handed to the launched process, in command-line order.
///
/// Repeated names stay in the list. The manager applies entries front to back,
/// so the process ends up with the last value given; [`Env::get`] agrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(pub Vec<EnvVar>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in the order they were given.
    pub fn iter(&self) -> std::slice::Iter<'_, EnvVar> {
        self.0.iter()
    }

    /// Value the process would observe for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|var| var.name() == name)
            .map(EnvVar::value)
    }

    /// Append `name=value` after every existing entry.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(EnvVar::new(name, value));
    }
}

impl From<Vec<EnvVar>> for Env {
    fn from(vars: Vec<EnvVar>) -> Self {
        Self(vars)
    }
}

impl FromIterator<EnvVar> for Env {
    fn from_iter<I: IntoIterator<Item = EnvVar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Env {
    type Item = &'a EnvVar;
    type IntoIter = std::slice::Iter<'a, EnvVar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

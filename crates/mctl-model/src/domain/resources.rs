use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

pub const DEFAULT_CPUS: f64 = 0.1;
pub const DEFAULT_MEM_MB: f64 = 64.0;

/// Scalar resource requirements of a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    pub cpus: f64,
    /// Memory in MiB.
    pub mem: f64,
}

impl Resources {
    pub fn new(cpus: f64, mem: f64) -> Self {
        Self { cpus, mem }
    }

    /// Both values must be finite and strictly positive.
    pub fn validate(&self) -> ModelResult<()> {
        for (name, value) in [("cpus", self.cpus), ("mem", self.mem)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            cpus: DEFAULT_CPUS,
            mem: DEFAULT_MEM_MB,
        }
    }
}

use serde::{Deserialize, Serialize};

use mctl_model::DEFAULT_USER;

/// Framework identity sent when registering with the manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameworkConfig {
    /// Framework name shown in the manager UI.
    pub name: String,
    /// User the framework registers as.
    pub user: String,
    /// Resource role offers are drawn from.
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// How long the manager keeps tasks alive after the framework disconnects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover_timeout_secs: Option<f64>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            name: "mctl".to_string(),
            user: DEFAULT_USER.to_string(),
            role: "*".to_string(),
            hostname: None,
            failover_timeout_secs: None,
        }
    }
}

use serde::Serialize;

/// A config key the host application should read from the environment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub key: String,
    pub env: String,
    pub default: bool,
}

/// What installing the plugin changes in the host project.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InstallationResult {
    pub config_updates: Vec<ConfigUpdate>,
}

impl InstallationResult {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn update_config(
        mut self,
        key: impl Into<String>,
        env: impl Into<String>,
        default: bool,
    ) -> Self {
        self.config_updates.push(ConfigUpdate {
            key: key.into(),
            env: env.into(),
            default,
        });
        self
    }
}

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::ProvisionError;

/// Read access to the deployment target's current environment.
pub trait DeploymentTarget {
    fn env_var(&self, key: &str) -> Option<String>;
}

impl DeploymentTarget for HashMap<String, String> {
    fn env_var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Environment of a target as recorded in a dotenv file.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// A missing file is an empty environment.
    pub fn load(path: &Path) -> Result<Self, ProvisionError> {
        if !path.exists() {
            debug!(path = %path.display(), "env file not found; treating as empty");
            return Ok(Self::default());
        }
        let vars = dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
        debug!(path = %path.display(), count = vars.len(), "env file loaded");
        Ok(Self { vars })
    }
}

impl DeploymentTarget for EnvFile {
    fn env_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

use tracing::info;

use crate::error::ProvisionError;
use crate::service::console::Console;

/// Decides whether provisioning should run for a target, given its current `DB_HOST`.
#[derive(Debug, Clone)]
pub struct DeployGuard {
    private_domain: String,
}

impl DeployGuard {
    pub fn new(private_domain: impl Into<String>) -> Self {
        Self {
            private_domain: private_domain.into(),
        }
    }

    /// False when the target already points at the provider's private network.
    pub fn should_run(&self, current_host: Option<&str>) -> bool {
        match current_host {
            Some(host) if host.contains(&self.private_domain) => {
                info!(host, "target already on a managed cluster; skipping");
                false
            }
            _ => true,
        }
    }

    /// Asks before repointing a target that already has a database host.
    pub fn confirm_run<C: Console + ?Sized>(
        &self,
        current_host: Option<&str>,
        console: &mut C,
    ) -> Result<bool, ProvisionError> {
        let Some(current) = current_host.filter(|h| !h.is_empty()) else {
            return Ok(true);
        };
        console.confirm(
            &format!("Your current database connection is pointed to {current}, continue?"),
            true,
        )
    }
}

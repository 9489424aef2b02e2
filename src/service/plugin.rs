use tracing::info;

use crate::api::DigitalOceanClient;
use crate::config::Config;
use crate::error::ProvisionError;
use crate::service::console::Console;
use crate::service::guard::DeployGuard;
use crate::service::provisioner::Provisioner;
use crate::service::target::DeploymentTarget;
use crate::types::bundle::CredentialBundle;
use crate::types::install::InstallationResult;

pub const DB_HOST: &str = "DB_HOST";
pub const ALLOW_DISABLED_PK_KEY: &str = "database.allow_disabled_pk";
pub const ALLOW_DISABLED_PK_ENV: &str = "DATABASE_ALLOW_DISABLED_PK";

/// DigitalOcean managed database plugin.
///
/// `install` and `deploy` are independent; neither assumes the other ran.
pub struct DigitalOceanDatabase {
    config: Config,
    guard: DeployGuard,
}

impl DigitalOceanDatabase {
    pub fn new(config: Config) -> Self {
        let guard = DeployGuard::new(config.private_domain.clone());
        Self { config, guard }
    }

    pub fn name(&self) -> &'static str {
        "DigitalOcean Database"
    }

    /// Registers the config flag the migration runner reads to relax primary-key enforcement.
    pub fn install(&self) -> InstallationResult {
        InstallationResult::create().update_config(
            ALLOW_DISABLED_PK_KEY,
            ALLOW_DISABLED_PK_ENV,
            false,
        )
    }

    pub fn should_deploy<T: DeploymentTarget + ?Sized>(&self, target: &T) -> bool {
        self.guard.should_run(target.env_var(DB_HOST).as_deref())
    }

    pub fn confirm_deploy<T, C>(&self, target: &T, console: &mut C) -> Result<bool, ProvisionError>
    where
        T: DeploymentTarget + ?Sized,
        C: Console + ?Sized,
    {
        self.guard
            .confirm_run(target.env_var(DB_HOST).as_deref(), console)
    }

    /// Provision a database for `target`.
    ///
    /// `None` when the target is already on a managed cluster or the operator chose
    /// not to repoint it.
    pub async fn deploy<T, C>(
        &self,
        target: &T,
        console: &mut C,
        isolated_user: &str,
    ) -> Result<Option<CredentialBundle>, ProvisionError>
    where
        T: DeploymentTarget + ?Sized,
        C: Console + ?Sized,
    {
        if !self.should_deploy(target) {
            return Ok(None);
        }
        if !self.confirm_deploy(target, &mut *console)? {
            info!("operator kept the current database connection");
            return Ok(None);
        }

        let client = DigitalOceanClient::connect(&self.config, &mut *console).await?;
        let bundle = Provisioner::new(&client, console)
            .with_max_attempts(self.config.max_attempts)
            .provision(isolated_user)
            .await?;
        Ok(Some(bundle))
    }
}

//! Cluster selection and user/database reconciliation.
//!
//! One attempt walks: list clusters, pick one, ask for names, reconcile the user,
//! reconcile the database, assemble the bundle. Declining to reuse an existing user or
//! database abandons the attempt and starts a new one from the top.

use std::num::NonZeroU32;

use tracing::{debug, info};

use crate::api::DatabaseProvider;
use crate::error::ProvisionError;
use crate::service::console::{Console, choose_from};
use crate::types::bundle::{CredentialBundle, engine_alias};
use crate::types::cluster::Cluster;

/// Outcome of reconciling one named resource against a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled<T> {
    Reused(T),
    Created(T),
    /// Operator refused to reuse the existing resource.
    Declined,
}

/// Outcome of a single provisioning attempt.
#[derive(Debug)]
enum Attempt {
    Provisioned(CredentialBundle),
    Restart,
}

pub struct Provisioner<'a, P: ?Sized, C: ?Sized> {
    provider: &'a P,
    console: &'a mut C,
    max_attempts: Option<NonZeroU32>,
}

impl<'a, P, C> Provisioner<'a, P, C>
where
    P: DatabaseProvider + ?Sized,
    C: Console + ?Sized,
{
    pub fn new(provider: &'a P, console: &'a mut C) -> Self {
        Self {
            provider,
            console,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<NonZeroU32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Run attempts until one yields a complete bundle.
    ///
    /// `default_database` seeds the database name prompt.
    pub async fn provision(
        &mut self,
        default_database: &str,
    ) -> Result<CredentialBundle, ProvisionError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if let Some(max) = self.max_attempts
                && attempt > max.get()
            {
                return Err(ProvisionError::AttemptsExhausted(max.get()));
            }
            debug!(attempt, "provisioning attempt");
            match self.attempt(default_database).await? {
                Attempt::Provisioned(bundle) => {
                    info!(
                        attempt,
                        database = %bundle.database,
                        user = %bundle.username,
                        host = %bundle.host,
                        "database provisioned"
                    );
                    return Ok(bundle);
                }
                Attempt::Restart => info!(attempt, "reuse declined; starting over"),
            }
        }
    }

    async fn attempt(&mut self, default_database: &str) -> Result<Attempt, ProvisionError> {
        let clusters = self.provider.list_clusters().await?;
        let cluster = self.select_cluster(&clusters)?;
        info!(cluster = %cluster.name, engine = %cluster.engine, "cluster selected");
        // Must fail before any creation call.
        let private = cluster
            .private_connection
            .as_ref()
            .ok_or_else(|| ProvisionError::MissingPrivateConnection(cluster.name.clone()))?;

        let database = self.console.ask("Database", Some(default_database))?;
        let username = self.console.ask("Database User", Some(database.as_str()))?;

        let password = match self.reconcile_user(cluster, &username).await? {
            Reconciled::Reused(password) | Reconciled::Created(password) => password,
            Reconciled::Declined => return Ok(Attempt::Restart),
        };
        if self.reconcile_database(cluster, &database).await? == Reconciled::Declined {
            return Ok(Attempt::Restart);
        }

        Ok(Attempt::Provisioned(CredentialBundle {
            engine_alias: engine_alias(&cluster.engine).to_string(),
            database,
            username,
            host: private.host.clone(),
            port: private.port,
            password,
            allow_disabled_primary_key: true,
        }))
    }

    fn select_cluster<'c>(
        &mut self,
        clusters: &'c [Cluster],
    ) -> Result<&'c Cluster, ProvisionError> {
        match clusters {
            [] => Err(ProvisionError::NoClusters),
            [only] => Ok(only),
            many => choose_from(&mut *self.console, "Choose a database cluster", many, |c| {
                c.name.as_str()
            }),
        }
    }

    /// Resolves the password for `username`, creating the user when it does not exist.
    async fn reconcile_user(
        &mut self,
        cluster: &Cluster,
        username: &str,
    ) -> Result<Reconciled<String>, ProvisionError> {
        if let Some(existing) = cluster.find_user(username) {
            if !self
                .console
                .confirm("User already exists, do you want to continue?", true)?
            {
                return Ok(Reconciled::Declined);
            }
            let password = existing
                .password
                .clone()
                .ok_or_else(|| ProvisionError::MissingPassword(username.to_string()))?;
            return Ok(Reconciled::Reused(password));
        }

        self.console.announce("Creating user", username)?;
        let created = self.provider.create_user(&cluster.id, username).await?;
        let password = created
            .password
            .ok_or_else(|| ProvisionError::MissingPassword(username.to_string()))?;
        Ok(Reconciled::Created(password))
    }

    async fn reconcile_database(
        &mut self,
        cluster: &Cluster,
        database: &str,
    ) -> Result<Reconciled<()>, ProvisionError> {
        if cluster.has_database(database) {
            let reuse = self
                .console
                .confirm("Database already exists, do you want to continue?", true)?;
            return Ok(if reuse {
                Reconciled::Reused(())
            } else {
                Reconciled::Declined
            });
        }

        self.console.announce("Creating database", database)?;
        self.provider.create_database(&cluster.id, database).await?;
        Ok(Reconciled::Created(()))
    }
}

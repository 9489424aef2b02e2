use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Config, DIGITALOCEAN_TOKEN_URL};
use crate::error::{IsRetryable, ProvisionError};
use crate::service::console::Console;
use crate::types::cluster::{Cluster, ClusterList, CreatedUser, DatabaseUser};

/// Provider operations the provisioner relies on.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    async fn list_clusters(&self) -> Result<Vec<Cluster>, ProvisionError>;

    async fn create_user(
        &self,
        cluster_id: &str,
        name: &str,
    ) -> Result<DatabaseUser, ProvisionError>;

    async fn create_database(&self, cluster_id: &str, name: &str) -> Result<(), ProvisionError>;
}

/// Describes which credentials the API needs and where to obtain them.
#[derive(Debug, Clone)]
pub struct ApiCredentialsPrompt {
    pub display_name: &'static str,
    pub url: &'static str,
    pub credentials: &'static [&'static str],
}

impl ApiCredentialsPrompt {
    pub const DIGITALOCEAN: ApiCredentialsPrompt = ApiCredentialsPrompt {
        display_name: "DigitalOcean",
        url: DIGITALOCEAN_TOKEN_URL,
        credentials: &["token"],
    };
}

fn default_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(3)
        .with_jitter()
}

/// Bearer-authenticated JSON client for the DigitalOcean v2 API.
#[derive(Clone)]
pub struct DigitalOceanClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    retry_policy: ExponentialBuilder,
}

impl DigitalOceanClient {
    pub fn new(cfg: &Config, token: impl Into<String>) -> Result<Self, ProvisionError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("do-database/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout());
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        // `Url::join` drops the last segment unless the base ends with a slash.
        let mut base = cfg.api_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: builder.build()?,
            base,
            token: token.into(),
            retry_policy: default_retry_policy(),
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: ExponentialBuilder) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Connect with the configured token, or ask the operator for one.
    ///
    /// A prompted token that fails verification is asked for again; a configured one is
    /// returned as [`ProvisionError::InvalidToken`].
    pub async fn connect<C: Console + ?Sized>(
        cfg: &Config,
        console: &mut C,
    ) -> Result<Self, ProvisionError> {
        if let Some(token) = cfg.token.as_deref() {
            let client = Self::new(cfg, token)?;
            client.verify().await?;
            return Ok(client);
        }

        let prompt = ApiCredentialsPrompt::DIGITALOCEAN;
        console.announce(
            &format!("{} API token required", prompt.display_name),
            &format!("create one at {}", prompt.url),
        )?;
        loop {
            let token = console.ask(&format!("{} API token", prompt.display_name), None)?;
            let client = Self::new(cfg, token.trim())?;
            match client.verify().await {
                Ok(()) => return Ok(client),
                Err(ProvisionError::InvalidToken) => {
                    warn!("{} rejected the supplied token", prompt.display_name);
                    console.announce("Token rejected", "try again")?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Cheap authenticated request used as a connectivity test.
    pub async fn verify(&self) -> Result<(), ProvisionError> {
        let _: serde_json::Value = self.get_json("databases", &[("per_page", "1")]).await?;
        info!(api = %self.base, "DigitalOcean API reachable");
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, ProvisionError> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ProvisionError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        (|| async {
            let resp = self
                .http
                .get(url.clone())
                .bearer_auth(&self.token)
                .query(query)
                .send()
                .await?;
            decode(resp).await
        })
        .retry(self.retry_policy)
        .when(|e: &ProvisionError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!("GET {} retrying after error {}, sleeping {:?}", path, err, dur);
        })
        .await
    }

    /// Creation calls are not idempotent, so no retry here.
    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ProvisionError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .http
            .post(self.url(path)?)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ProvisionError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        return Err(ProvisionError::from_api_body(status, &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl DatabaseProvider for DigitalOceanClient {
    async fn list_clusters(&self) -> Result<Vec<Cluster>, ProvisionError> {
        let list: ClusterList = self.get_json("databases", &[]).await?;
        debug!(count = list.databases.len(), "listed database clusters");
        Ok(list.databases)
    }

    async fn create_user(
        &self,
        cluster_id: &str,
        name: &str,
    ) -> Result<DatabaseUser, ProvisionError> {
        let created: CreatedUser = self
            .post_json(
                &format!("databases/{cluster_id}/users"),
                &json!({ "name": name }),
            )
            .await?;
        info!(cluster = cluster_id, user = name, "database user created");
        Ok(created.user)
    }

    async fn create_database(&self, cluster_id: &str, name: &str) -> Result<(), ProvisionError> {
        let _: serde_json::Value = self
            .post_json(
                &format!("databases/{cluster_id}/dbs"),
                &json!({ "name": name }),
            )
            .await?;
        info!(cluster = cluster_id, database = name, "database created");
        Ok(())
    }
}

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

use crate::error::ProvisionError;

pub const DIGITALOCEAN_API_URL: &str = "https://api.digitalocean.com/v2/";
pub const DIGITALOCEAN_TOKEN_URL: &str = "https://cloud.digitalocean.com/account/api/tokens";
pub const DIGITALOCEAN_PRIVATE_DOMAIN: &str = "db.ondigitalocean.com";

/// Environment variable prefix for every config key, e.g. `DO_DATABASE_MAX_ATTEMPTS`.
pub const ENV_PREFIX: &str = "DO_DATABASE_";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api_url: Url,
    /// API token; prompted for when absent.
    pub token: Option<String>,
    pub proxy: Option<Url>,
    pub loglevel: String,
    /// Host suffix of the provider's private network.
    pub private_domain: String,
    /// Upper bound on provisioning restarts. Unset keeps asking until the operator accepts.
    pub max_attempts: Option<NonZeroU32>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DIGITALOCEAN_API_URL).expect("static API url is valid"),
            token: None,
            proxy: None,
            loglevel: "info".to_string(),
            private_domain: DIGITALOCEAN_PRIVATE_DOMAIN.to_string(),
            max_attempts: None,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Defaults, then `DIGITALOCEAN_TOKEN`, then `DO_DATABASE_*` overrides.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(
                Env::raw()
                    .only(&["DIGITALOCEAN_TOKEN"])
                    .map(|_| "token".into()),
            )
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_env() -> Result<Self, ProvisionError> {
        Ok(Self::figment().extract()?)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_api_url(mut self, url: Url) -> Self {
        self.api_url = url;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<NonZeroU32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProvisionError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("env file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("DigitalOcean API error ({status}) {id}: {message}")]
    Api {
        status: StatusCode,
        id: String,
        message: String,
    },

    #[error("DigitalOcean rejected the API token")]
    InvalidToken,

    #[error("input closed while waiting for an answer")]
    InputClosed,

    #[error("no database clusters found on this account")]
    NoClusters,

    #[error("cluster {0} has no private connection")]
    MissingPrivateConnection(String),

    #[error("password for user {0} is not available")]
    MissingPassword(String),

    #[error("gave up after {0} provisioning attempts")]
    AttemptsExhausted(u32),
}

/// Errors worth another try against the provider.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for ProvisionError {
    fn is_retryable(&self) -> bool {
        match self {
            ProvisionError::Reqwest(e) => e.is_timeout() || e.is_connect(),
            ProvisionError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

/// Error body returned by the DigitalOcean API on non-2xx responses.
#[derive(Deserialize, Debug, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
}

impl ProvisionError {
    pub(crate) fn from_api_body(status: StatusCode, body: &[u8]) -> Self {
        let body: ApiErrorBody = serde_json::from_slice(body).unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return ProvisionError::InvalidToken;
        }
        ProvisionError::Api {
            status,
            id: body.id,
            message: body.message,
        }
    }
}

pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod types;

pub use config::Config;
pub use error::ProvisionError;
pub use service::plugin::DigitalOceanDatabase;
pub use types::bundle::CredentialBundle;

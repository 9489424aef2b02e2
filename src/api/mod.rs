pub mod digitalocean;

pub use digitalocean::{ApiCredentialsPrompt, DatabaseProvider, DigitalOceanClient};

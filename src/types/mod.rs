pub mod bundle;
pub mod cluster;
pub mod install;

pub use bundle::{CredentialBundle, engine_alias};
pub use cluster::{Cluster, ClusterList, Connection, DatabaseUser};
pub use install::{ConfigUpdate, InstallationResult};

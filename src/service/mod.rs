pub mod console;
pub mod guard;
pub mod plugin;
pub mod provisioner;
pub mod target;

pub use console::{Console, TerminalConsole};
pub use guard::DeployGuard;
pub use plugin::DigitalOceanDatabase;
pub use provisioner::{Provisioner, Reconciled};
pub use target::{DeploymentTarget, EnvFile};

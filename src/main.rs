use std::path::PathBuf;

use clap::{Parser, Subcommand};
use do_database::service::{EnvFile, TerminalConsole};
use do_database::{Config, DigitalOceanDatabase};
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "do-database", version, about = "Provision a DigitalOcean managed database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the config flag the project needs for relaxed primary keys
    Install,
    /// Select a cluster, reconcile user and database, print the DB_* variables
    Deploy {
        /// Current environment of the deployment target
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        /// Default database name, usually the site's isolated system user
        #[arg(long, env = "DO_DATABASE_ISOLATED_USER")]
        isolated_user: String,
        /// Print JSON instead of dotenv lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_level(true)
                .with_target(false),
        )
        .init();

    let token_source = if cfg.token.is_some() {
        "<configured>"
    } else {
        "<prompt>"
    };
    info!(
        api = %cfg.api_url,
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        token = token_source,
        loglevel = %cfg.loglevel
    );

    let plugin = DigitalOceanDatabase::new(cfg);
    match cli.command {
        Command::Install => {
            let result = plugin.install();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Deploy {
            env_file,
            isolated_user,
            json,
        } => {
            let target = EnvFile::load(&env_file)?;
            let mut console = TerminalConsole::stdio();
            match plugin.deploy(&target, &mut console, &isolated_user).await? {
                Some(bundle) if json => println!("{}", serde_json::to_string_pretty(&bundle)?),
                Some(bundle) => print!("{}", bundle.to_dotenv()),
                None => info!(name = plugin.name(), "nothing to deploy"),
            }
        }
    }
    Ok(())
}

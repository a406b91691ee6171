use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rsspin::{
    cmd::{self, Services},
    config::Config,
};

#[derive(Debug, Parser)]
#[command(version, about = "Forwards new RSS entries to a chat channel")]
struct Cli {
    /// Path to the config file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Post and pin the initial settings message
    Init {
        /// Feed to start with, as NAME=URL (repeatable)
        #[arg(long = "feed", value_name = "NAME=URL")]
        feeds: Vec<String>,
    },
    /// Scan every feed once and forward new entries
    Scan,
    /// Show the feeds and last scan time from the pinned settings
    List,
    /// Scan on a schedule until interrupted
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let mut services = Services::new(&config)?;

    match cli.command {
        Command::Init { feeds } => {
            let id = cmd::setup::execute(services.messenger.as_ref(), &feeds).await?;
            info!("Settings message {} pinned", id);
            println!("{}", id);
        }
        Command::Scan => {
            cmd::sync::execute(&mut services).await?;
        }
        Command::List => {
            println!("{}", cmd::list::execute(services.messenger.as_ref()).await?);
        }
        Command::Run => {
            cmd::run::execute(services, config.check_interval_minutes).await?;
        }
    }

    Ok(())
}

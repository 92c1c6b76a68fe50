use anchorspace_core::core_identity::Aid;
use anchorspace_core::core_space::storage::SpaceSqlStore;
use anchorspace_core::core_space::SpaceStore;
use anchorspace_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use anchorspace_core::metrics::init_metrics;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "anchorspace")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Data directory holding the space store database
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Inspect the identity-to-space mapping
    #[command(subcommand)]
    Spaces(SpacesCommand),
}

#[derive(Parser, Debug)]
enum SpacesCommand {
    /// List all known space records
    List,
    /// Show the space records owned by one identity
    Show {
        /// Owner identity (AID)
        aid: String,
    },
}

fn open_store(data_dir: &PathBuf) -> Result<SpaceSqlStore> {
    let path = data_dir.join("spaces.db");
    SpaceSqlStore::open(&path).with_context(|| format!("opening space store at {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = LogLevel::from_str(&args.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        LogLevel::Info
    });

    let config = LogConfig::new(log_level).json_format(args.json_logs);
    init_logging_with_config(config)?;
    init_metrics();

    match args.command {
        Command::Spaces(SpacesCommand::List) => {
            let store = open_store(&args.data_dir)?;
            let spaces = store.list_all_spaces().context("listing spaces")?;
            info!(count = spaces.len(), "space records loaded");
            println!("{}", serde_json::to_string_pretty(&spaces)?);
        }
        Command::Spaces(SpacesCommand::Show { aid }) => {
            let store = open_store(&args.data_dir)?;
            let owner = Aid::new(aid.as_str());
            let spaces: Vec<_> = store
                .list_all_spaces()
                .context("listing spaces")?
                .into_iter()
                .filter(|s| s.owner_aid == owner)
                .collect();
            if spaces.is_empty() {
                anyhow::bail!("no space record for {}", aid);
            }
            println!("{}", serde_json::to_string_pretty(&spaces)?);
        }
    }

    Ok(())
}

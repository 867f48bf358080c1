//! watchlist: interactive watchlist session.
//!
//! One process is one session: the watchlist starts empty (or from
//! `--import`), lives in memory while the shell runs, and is discarded on
//! exit. Use `export` to keep a backup.
//!
//! Usage:
//!   cargo run -p watchlist-cli
//!   cargo run -p watchlist-cli -- --import watchlist-2024-03-09.json
//!   cargo run -p watchlist-cli -- --export-dir /var/backups/watchlist

mod config;
mod shell;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use watchlist_store::WatchlistStore;

use config::WatchlistConfig;
use shell::{Command, Shell, HELP};

#[derive(Debug, Parser)]
#[command(name = "watchlist", version, about = "Session watchlist with search, export and import")]
struct Cli {
    /// Load a watchlist backup before starting
    #[arg(long, value_name = "PATH")]
    import: Option<PathBuf>,

    /// Directory for `export` (overrides WATCHLIST_EXPORT_DIR)
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchlist=info,watchlist_store=info,watchlist_views=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = WatchlistConfig::from_env();
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }
    tracing::debug!("Session config: {:?}", config);

    let store = Arc::new(WatchlistStore::new());
    let shell = Shell::new(Arc::clone(&store), config);

    if let Some(path) = cli.import {
        let applied = shell.import(&path)?;
        tracing::info!("Preloaded {} records from {}", applied, path.display());
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        match shell.execute(command).await {
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    tracing::info!("Session ended with {} watched symbols", store.count());
    Ok(())
}

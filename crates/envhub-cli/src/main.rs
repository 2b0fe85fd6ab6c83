//! envhub: operator CLI for versioned, encrypted environment bundles.
//!
//! Bundles live under a local data directory using the same
//! `{project}/{service}/{environment}/v{N}.json` layout an object store would
//! hold.

mod commands;
mod config;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envhub_store::{EnvKey, EnvStoreService, FileSystemBlobStore, MasterKey};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::commands::PushOptions;
use crate::config::CliConfig;

/// envhub: versioned, encrypted environment bundles
#[derive(Parser, Debug)]
#[command(name = "envhub", version)]
#[command(about = "Push, pull and inspect versioned environment bundles")]
struct Args {
    /// Data directory (overrides ENVHUB_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Bundle coordinates shared by most subcommands.
#[derive(clap::Args, Debug)]
struct KeyArgs {
    project: String,
    service: String,
    environment: String,
}

impl KeyArgs {
    fn key(&self) -> Result<EnvKey> {
        Ok(EnvKey::new(
            self.project.as_str(),
            self.service.as_str(),
            self.environment.as_str(),
        )?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a .env file as the next version
    Push {
        #[command(flatten)]
        key: KeyArgs,

        /// .env file to read
        #[arg(short, long, default_value = ".env")]
        file: PathBuf,

        /// Reason recorded with the new version
        #[arg(short, long)]
        reason: Option<String>,

        /// Identity recorded as the author (default: ENVHUB_USER or USER)
        #[arg(long)]
        author: Option<String>,

        /// Create a version even if nothing changed
        #[arg(long)]
        force: bool,

        /// Upper-case variable names and drop characters outside A-Z0-9_
        #[arg(long)]
        canonical: bool,
    },

    /// Write a stored version as .env text
    Pull {
        #[command(flatten)]
        key: KeyArgs,

        /// Version to read (default: latest)
        #[arg(short, long)]
        version: Option<u64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored versions, newest first
    History {
        #[command(flatten)]
        key: KeyArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List projects, services of a project, or environments of a service
    Browse {
        /// "", "project" or "project/service"
        #[arg(default_value = "")]
        path: String,
    },

    /// Print a freshly generated master key
    Keygen,
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env("ENVHUB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();

    if let Command::Keygen = args.command {
        println!("{}", MasterKey::generate().to_base64());
        return Ok(());
    }

    let mut config = CliConfig::load();
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    let master_key = config
        .master_key()
        .context("ENVHUB_MASTER_KEY is not a valid 32-byte base64 key")?;
    if master_key.is_insecure_default() {
        warn!("ENVHUB_MASTER_KEY is not set; values are encrypted with a publicly known key");
    }

    let blob_store = Arc::new(FileSystemBlobStore::new(&config.data_dir));
    let store = EnvStoreService::new(blob_store, &master_key, config.store_config());

    match args.command {
        Command::Push {
            key,
            file,
            reason,
            author,
            force,
            canonical,
        } => {
            let key = key.key()?;
            let dotenv = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let options = PushOptions {
                reason,
                force,
                canonical_names: canonical,
            };
            let author = config.author(author.as_deref());

            let outcome = commands::push(&store, &key, &dotenv, &author, &options).await?;
            if outcome.created {
                info!("Created {} v{}", key, outcome.version);
            } else {
                info!("No changes; {} stays at v{}", key, outcome.version);
            }
        }
        Command::Pull {
            key,
            version,
            output,
        } => {
            let key = key.key()?;
            let text = commands::pull(&store, &key, version).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, text)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Wrote {} to {}", key, path.display());
                }
                None => print_stdout(&text)?,
            }
        }
        Command::History { key, json } => {
            let text = commands::history(&store, &key.key()?, json).await?;
            print_stdout(&text)?;
        }
        Command::Browse { path } => {
            let text = commands::browse(&store, &path).await?;
            print_stdout(&text)?;
        }
        Command::Keygen => {}
    }

    Ok(())
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

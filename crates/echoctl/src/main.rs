//! Echo command-line entry points

mod commands;
mod logs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use echocache::{HttpFetcher, PAGE_TTL};
use echostore::{KvStore, MemoryStore, RedisStore, DEFAULT_URL};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Store address
    #[arg(short, long, default_value = DEFAULT_URL, global = true)]
    redis: String,

    /// Use an in-process store instead of connecting to one
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store values through the instrumented cache and replay the calls.
    /// Flushes the store first.
    Exercise {
        /// Values to store (integers and floats are stored as numbers)
        values: Vec<String>,
    },

    /// Fetch a page through the counting page cache
    Web {
        /// Page URL
        url: String,

        /// Number of consecutive fetches
        #[arg(short, long, default_value_t = 1)]
        times: u32,

        /// Seconds a fetched page stays cached
        #[arg(long, default_value_t = PAGE_TTL.as_secs())]
        ttl: u64,

        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Print request statistics for a JSON-lines access log
    LogStats {
        /// Log file, one JSON document per line
        file: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_store(args: &Args) -> Result<Arc<dyn KvStore>> {
    if args.memory {
        info!("Using in-process store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = RedisStore::open(&args.redis)
        .with_context(|| format!("Failed to connect to {}", args.redis))?;
    Ok(Arc::new(store))
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut stdout = std::io::stdout().lock();

    match &args.command {
        Command::Exercise { values } => {
            let store = open_store(&args)?;
            commands::exercise(store, values, &mut stdout)
        }
        Command::Web {
            url,
            times,
            ttl,
            timeout,
        } => {
            if *ttl == 0 {
                anyhow::bail!("--ttl must be at least 1 second");
            }
            let store = open_store(&args)?;
            let fetcher = HttpFetcher::with_timeout(Duration::from_secs(*timeout))?;
            commands::web(
                store,
                fetcher,
                url,
                *times,
                Duration::from_secs(*ttl),
                &mut stdout,
            )
        }
        Command::LogStats { file, json } => commands::log_stats(file, *json, &mut stdout),
    }
}

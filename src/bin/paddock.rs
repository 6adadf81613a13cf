//! paddock: query race data through the session and schedule caches.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use paddock::{Config, Paddock};

/// Paddock race data CLI
#[derive(Parser)]
#[command(name = "paddock")]
#[command(version = paddock::PKG_VERSION)]
#[command(about = "Cached race session and schedule lookups")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Race data API base URL (overrides config).
    #[arg(long, env = "PADDOCK_UPSTREAM_URL")]
    upstream: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a session's lap data
    Session {
        /// Season, e.g. 2024
        year: String,
        /// Round number within the season
        round: String,
    },

    /// Print the event calendar for a season
    Schedule {
        /// Season, e.g. 2024
        year: i32,
    },

    /// Print one round of the calendar
    Event {
        year: i32,
        round: u32,
    },

    /// Print a driver's fastest lap with sector times
    FastestLap {
        year: String,
        round: String,
        /// Driver abbreviation, e.g. VER
        driver: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.upstream {
        config.upstream.base_url = url;
    }

    info!(
        version = paddock::version_string(),
        upstream = %config.upstream.base_url,
        "paddock starting"
    );

    let service = Paddock::builder().config(&config).build()?;

    match args.command {
        Command::Session { year, round } => {
            print_json(&*service.session_by_text(&year, &round).await?)?;
        }
        Command::Schedule { year } => {
            print_json(&*service.schedule(year).await?)?;
        }
        Command::Event { year, round } => {
            print_json(&service.event(year, round).await?)?;
        }
        Command::FastestLap {
            year,
            round,
            driver,
        } => {
            let key = paddock::CacheKey::parse(&year, &round)?;
            print_json(&service.fastest_lap(key.year, key.round, &driver).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

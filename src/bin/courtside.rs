//! courtside: query player ratings from the command line
//!
//! Runs one pipeline against the configured store and prints the result
//! as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courtside::config::Config;
use courtside::gateway::roster::ranked;
use courtside::types::canonical_team_name;
use courtside::{Courtside, HistoryLimit, PlayerId};
use serde::Serialize;

/// Courtside CLI
#[derive(Parser)]
#[command(name = "courtside")]
#[command(version = courtside::PKG_VERSION)]
#[command(about = "Cached player ratings queries")]
struct Args {
    /// Config file (default: ~/.courtside/config.toml, then /etc/courtside/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store base URL (overrides config and SUPABASE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Store anonymous API key (overrides config and SUPABASE_ANON_KEY)
    #[arg(long)]
    anon_key: Option<String>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print version information
    Version,

    /// Active roster snapshot, ranked by DPM
    Active {
        /// Restrict to one team (underscores read as spaces)
        #[arg(short, long)]
        team: Option<String>,
    },

    /// Every known player, with live metrics for active players
    Index,

    /// Search players by name
    Search {
        /// Name fragment (at least two characters)
        term: String,
    },

    /// Most recent rating row for one player
    Current {
        /// NBA player id
        id: String,
    },

    /// Rating history for one player, oldest first
    History {
        /// NBA player id
        id: String,
        /// Most recent rows to include (default 1000, max 2000)
        #[arg(short, long)]
        limit: Option<String>,
        /// Walk the whole career instead of the most recent rows
        #[arg(long, conflicts_with = "limit")]
        full: bool,
    },

    /// Longevity table rows
    Longevity {
        /// Include every indexed player, not only the active roster
        #[arg(long)]
        all: bool,
    },

    /// Projected retirement age by season for one player
    Trajectory {
        /// NBA player id
        id: String,
    },

    /// Team page bundle: roster, simulation, and win distribution
    Team {
        /// Team name (underscores read as spaces)
        name: String,
    },

    /// Simulated conference standings
    Standings {
        /// Conference name, e.g. "East"
        conference: String,
    },
}

fn print<T: Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if let Command::Version = args.command {
        println!("courtside {}", courtside::version_string());
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())?;
    if args.url.is_some() {
        config.store.url = args.url;
    }
    if args.anon_key.is_some() {
        config.store.anon_key = args.anon_key;
    }

    let gateway = Courtside::builder()
        .store_config(config.store_config()?)
        .policy(config.cache_policy()?)
        .build()?;

    match args.command {
        Command::Version => {}
        Command::Active { team } => {
            let team = team.as_deref().map(canonical_team_name);
            let players = gateway.active_players(team.as_deref()).await?;
            print(&ranked(&players), args.pretty)?;
        }
        Command::Index => print(&gateway.player_index().await?, args.pretty)?,
        Command::Search { term } => print(&gateway.search_players(&term).await?, args.pretty)?,
        Command::Current { id } => {
            let id = PlayerId::parse(&id)?;
            print(&gateway.player_current(id).await?, args.pretty)?;
        }
        Command::History { id, limit, full } => {
            let id = PlayerId::parse(&id)?;
            if full {
                print(&gateway.full_player_history(id).await?, args.pretty)?;
            } else {
                let limit = HistoryLimit::from_param(limit.as_deref());
                print(&gateway.player_history(id, limit).await?, args.pretty)?;
            }
        }
        Command::Longevity { all } => print(&gateway.longevity_rows(!all).await?, args.pretty)?,
        Command::Trajectory { id } => {
            let id = PlayerId::parse(&id)?;
            print(&gateway.longevity_trajectory(id).await?, args.pretty)?;
        }
        Command::Team { name } => {
            let bundle = gateway.team_bundle(&canonical_team_name(&name)).await?;
            print(&bundle, args.pretty)?;
        }
        Command::Standings { conference } => {
            print(&gateway.conference_standings(&conference).await?, args.pretty)?;
        }
    }

    Ok(())
}

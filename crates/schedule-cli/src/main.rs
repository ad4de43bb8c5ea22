//! `schedule` CLI -- list meeting occurrences and find common free slots
//! over a calendar snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Occurrences for alice in a window (snapshot on stdin)
//! schedule list --user alice --start 2023-03-07T16:00:00Z --end 2023-03-07T19:00:00Z < calendar.json
//!
//! # Earliest 30 minute slot for alice and bob
//! schedule --data calendar.json find-slot --users alice,bob --start 2023-03-08T16:00:00Z --duration 30
//!
//! # A stored meeting by id
//! schedule --data calendar.json show --id standup
//!
//! # Custom search horizon, with debug logging on stderr
//! schedule -vv --data calendar.json --config schedule.toml find-slot --users bob --start 2023-03-08T00:00:00 --duration 60
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use schedule_engine::{InMemoryStore, Scheduler, SchedulerConfig};
use serde::Serialize;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Meeting occurrence listing and free-slot search"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Calendar snapshot JSON (reads from stdin if omitted)
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Scheduler configuration TOML
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List every occurrence involving the users in a time window
    List {
        /// Comma-separated user logins
        #[arg(short, long = "user", value_delimiter = ',', required = true)]
        users: Vec<String>,
        /// Window start (RFC 3339, or naive UTC)
        #[arg(long)]
        start: String,
        /// Window end, exclusive
        #[arg(long)]
        end: String,
    },
    /// Find the earliest slot at which all users are free
    FindSlot {
        /// Comma-separated user logins
        #[arg(short, long, value_delimiter = ',', required = true)]
        users: Vec<String>,
        /// Earliest acceptable start (RFC 3339, or naive UTC)
        #[arg(long)]
        start: String,
        /// Slot length in minutes, at least 1
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        duration: u32,
    },
    /// Print a stored meeting
    Show {
        #[arg(long)]
        id: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotResponse {
    start_time: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let snapshot = read_input(cli.data.as_deref())?;
    let store = InMemoryStore::from_json(&snapshot).context("Failed to load calendar snapshot")?;
    let scheduler = Scheduler::with_config(store, config)?;

    let output = match cli.command {
        Commands::List { users, start, end } => {
            let occurrences = scheduler.list_occurrences(users, parse_instant(&start)?, parse_instant(&end)?)?;
            serde_json::to_string_pretty(&occurrences)?
        }
        Commands::FindSlot {
            users,
            start,
            duration,
        } => {
            let slot = scheduler.find_slot(users, parse_instant(&start)?, duration)?;
            serde_json::to_string(&SlotResponse {
                start_time: slot.to_rfc3339_opts(SecondsFormat::Secs, true),
            })?
        }
        Commands::Show { id } => {
            let meeting = scheduler.store().get_meeting(&id)?;
            serde_json::to_string_pretty(meeting)?
        }
    };

    println!("{}", output);
    Ok(())
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Defaults apply when no file is given; validation happens when the
/// scheduler is built.
fn load_config(path: Option<&str>) -> Result<SchedulerConfig> {
    let Some(path) = path else {
        return Ok(SchedulerConfig::default());
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path))?;
    let config: SchedulerConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path))?;
    debug!(path, ?config, "loaded configuration");
    Ok(config)
}

/// Parse an instant as RFC 3339, falling back to a naive
/// `YYYY-MM-DDTHH:MM:SS` read as UTC.
fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .with_context(|| format!("Invalid datetime '{}'", s))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

//! `slots` CLI — weekly availability and appointment booking over a JSON
//! event file.
//!
//! ## Usage
//!
//! ```sh
//! # Bookable slots for the 7 days starting today
//! slots week -i events.json
//!
//! # ... starting on a given date, written to a file
//! slots week --from 2016-05-23 -i events.json -o week.json
//!
//! # Every opening in the window with its own slots (appointments not removed)
//! slots openings --from 2016-05-23 -i events.json
//!
//! # Check a booking against the file, and store it if admitted
//! slots admit --kind appointment --starts-at "2016-05-23 11:30" \
//!     --ends-at "2016-05-23 12:00" -i events.json --save
//! ```
//!
//! The event file is a JSON array of
//! `{"kind", "starts_at", "ends_at", "weekly_recurring"}` records. Records
//! that fail admission on load are skipped with a warning, and `--save` writes
//! them back unchanged. Logs go to stderr.

mod config;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::{list_openings, weekly_availability, MemoryStore, NewEvent};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Weekly slot availability from openings and appointments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (overrides RUST_LOG and the configured filter)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra configuration file to merge over the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bookable slots for each of the 7 days starting at --from
    Week {
        /// First day of the window (defaults to today)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Event file ("-" for stdin; defaults to the configured events_path)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Every opening in the 7 days starting at --from, with its own slots
    Openings {
        /// First day of the window (defaults to today)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Event file ("-" for stdin; defaults to the configured events_path)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Check a new event against the event file and optionally store it
    Admit {
        /// "opening" or "appointment"
        #[arg(long)]
        kind: String,
        /// Start, e.g. "2016-05-23 09:30" or 2016-05-23T09:30:00
        #[arg(long, value_parser = parse_datetime)]
        starts_at: NaiveDateTime,
        /// End (exclusive), same formats as --starts-at
        #[arg(long, value_parser = parse_datetime)]
        ends_at: NaiveDateTime,
        /// Repeat the opening every week from its start date
        #[arg(long)]
        weekly_recurring: bool,
        /// Event file (defaults to the configured events_path)
        #[arg(short, long)]
        input: Option<String>,
        /// Write the event file back with the admitted event appended
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(cli.verbose, &config);
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Week {
            from,
            input,
            output,
        } => {
            let store = load_store(read_requests(&events_source(input.as_deref(), &config))?);
            let from = from.unwrap_or_else(today);
            let days = weekly_availability(&store, from);
            write_json(output.as_deref(), &days)?;
        }
        Commands::Openings {
            from,
            input,
            output,
        } => {
            let store = load_store(read_requests(&events_source(input.as_deref(), &config))?);
            let from = from.unwrap_or_else(today);
            let listing = list_openings(&store, from);
            write_json(output.as_deref(), &listing)?;
        }
        Commands::Admit {
            kind,
            starts_at,
            ends_at,
            weekly_recurring,
            input,
            save,
        } => {
            let source = events_source(input.as_deref(), &config);
            if save && source == "-" {
                anyhow::bail!("--save needs an event file, not stdin");
            }

            let mut requests = read_requests(&source)?;
            let mut store = load_store(requests.clone());
            let mut candidate = NewEvent::new(kind, starts_at, ends_at);
            candidate.weekly_recurring = weekly_recurring;

            let event = store.insert(candidate.clone()).context("Event was not admitted")?;
            tracing::info!(id = event.id, kind = %event.kind, "event admitted");

            if save {
                // Records skipped at load stay in the file untouched.
                requests.push(candidate);
                let json = serde_json::to_string_pretty(&requests)?;
                std::fs::write(&source, json)
                    .with_context(|| format!("Failed to write file: {}", source))?;
            }
            write_json(None, &event)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, config: &Config) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    // try_init: a subscriber may already be installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// The clock is read here and nowhere else.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

/// Accepts `YYYY-MM-DDTHH:MM[:SS]` and `YYYY-MM-DD HH:MM[:SS]`.
fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("Invalid datetime '{}' (expected YYYY-MM-DD HH:MM)", s))
}

fn events_source(input: Option<&str>, config: &Config) -> String {
    match input {
        Some(path) => path.to_string(),
        None => config.events_path.display().to_string(),
    }
}

/// Read the raw records of the event file.
///
/// A missing file is an empty calendar.
fn read_requests(source: &str) -> Result<Vec<NewEvent>> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else if Path::new(source).exists() {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read file: {}", source))?
    } else {
        tracing::info!(path = source, "event file not found, starting empty");
        String::new()
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).with_context(|| format!("Invalid event file: {}", source))
}

/// Admit `requests` in order, skipping the ones that fail admission.
fn load_store(requests: Vec<NewEvent>) -> MemoryStore {
    let (store, rejected) = MemoryStore::from_requests(requests);
    for (request, error) in &rejected {
        tracing::warn!(
            kind = %request.kind,
            starts_at = %request.starts_at,
            %error,
            "skipping event"
        );
    }
    tracing::debug!(admitted = store.len(), rejected = rejected.len(), "loaded events");

    store
}

fn write_json<T: Serialize + ?Sized>(path: Option<&str>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}

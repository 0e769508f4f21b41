//! CLI commands for lake-levels.
//!
//! Fetch the latest readings, persist them, or print what is stored.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use lake_levels::config::AppConfig;
use lake_levels::{Lake, LevelStore, LevelTable, UsgsClient};

#[derive(Parser)]
#[command(name = "lake-levels")]
#[command(version, about = "Madison lake levels from USGS water data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch lake levels and print them
    Fetch {
        /// First day to fetch (YYYY-MM-DD or RFC 3339); latest sample if omitted
        #[arg(short, long, value_parser = parse_instant)]
        start: Option<DateTime<Utc>>,

        /// Last day to fetch; requires --start
        #[arg(short, long, value_parser = parse_instant)]
        end: Option<DateTime<Utc>>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Fetch lake levels and store the new rows
    Update {
        /// First day to fetch; defaults to the day of the latest stored row
        #[arg(short, long, value_parser = parse_instant)]
        start: Option<DateTime<Utc>>,

        /// Last day to fetch
        #[arg(short, long, value_parser = parse_instant)]
        end: Option<DateTime<Utc>>,

        /// Database path override
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print every stored row
    Show {
        /// Database path override
        #[arg(long)]
        db: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 instant
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .ok_or_else(|| format!("invalid date: {}", s));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected YYYY-MM-DD or RFC 3339, got {:?}: {}", s, e))
}

/// Fetch and print.
pub fn run_fetch(
    config: &AppConfig,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = UsgsClient::new(config.usgs.clone())?;
    let table = client.fetch(start, end).context("Failed to fetch lake levels")?;
    print_levels(&table, format)
}

/// Fetch and insert rows newer than anything already stored.
pub fn run_update(
    config: &AppConfig,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    db: Option<PathBuf>,
) -> anyhow::Result<()> {
    let db_path = db.unwrap_or_else(|| config.storage.db_path.clone());
    let mut store = LevelStore::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;

    let latest = store.latest_timestamp()?;
    if let Some(latest) = latest {
        info!("Latest stored reading: {}", latest);
    }
    let Some((start, end)) = resume_window(start, end, latest) else {
        info!("No new readings");
        store.close()?;
        return Ok(());
    };

    let client = UsgsClient::new(config.usgs.clone())?;
    let mut table = client.fetch(start, end).context("Failed to fetch lake levels")?;
    if let Some(latest) = latest {
        table.retain_after(latest);
    }

    if table.is_empty() {
        info!("No new readings");
    } else {
        let inserted = store.insert(&table)?;
        info!("Stored {} new rows in {}", inserted, db_path.display());
    }

    store.close()?;
    Ok(())
}

/// Window to fetch given the newest stored reading.
///
/// Without an explicit start the fetch resumes at midnight UTC of the latest
/// stored day, because the service selects whole days. `None` when `end` is
/// not after `latest`, since nothing new can come back.
fn resume_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
) -> Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let Some(latest) = latest else {
        return Some((start, end));
    };
    if end.is_some_and(|end| end <= latest) {
        return None;
    }
    let resume = latest
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight));
    Some((start.or(resume), end))
}

/// Print the stored table.
pub fn run_show(
    config: &AppConfig,
    db: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let db_path = db.unwrap_or_else(|| config.storage.db_path.clone());
    let store = LevelStore::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    let table = store.to_table()?;
    store.close()?;
    print_levels(&table, format)
}

fn print_levels(table: &LevelTable, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(table)?),
        OutputFormat::Table => print_table(table),
    }
    Ok(())
}

/// Print lake levels in table format.
fn print_table(table: &LevelTable) {
    print!("{:<25}", "timestamp (UTC)");
    for lake in Lake::ALL {
        print!("{:>10}", lake.name());
    }
    println!();

    for row in table {
        print!("{:<25}", row.timestamp.format("%Y-%m-%d %H:%M:%S"));
        for lake in Lake::ALL {
            match row.get(lake) {
                Some(height) => print!("{:>10.2}", height),
                None => print!("{:>10}", "-"),
            }
        }
        println!();
    }
}

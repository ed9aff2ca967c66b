use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::HistoryError;
use crate::util;

#[derive(Parser)]
#[command(name = "histree")]
#[command(about = "File hierarchy history with time-travel folder sizes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record the current state of a directory tree
    Scan(ScanArgs),

    /// Append a JSON batch of item states
    Import(ImportArgs),

    /// Show an item's history over a time window
    History(HistoryArgs),

    /// List tracked items and their current state
    Items(ItemsArgs),
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Directory to record
    pub root: PathBuf,

    /// Database file to use instead of the default location
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Show detailed output including diagnostics
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Batch document to append
    pub batch: PathBuf,

    /// Database file to use instead of the default location
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Show detailed output
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Item to query (a path for scanned items)
    pub item_id: String,

    /// Window start (RFC 3339, "YYYY-MM-DD HH:MM:SS", or "YYYY-MM-DD")
    #[arg(long)]
    pub from: Option<String>,

    /// Window end, defaults to now
    #[arg(long)]
    pub to: Option<String>,

    /// Window length ending at --to (e.g. 7d, 24h, 90m)
    #[arg(long, conflicts_with = "from")]
    pub last: Option<String>,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Database file to use instead of the default location
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Show timing and memory diagnostics
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ItemsArgs {
    /// Database file to use instead of the default location
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl HistoryArgs {
    /// Resolve the query window. `--to` defaults to now; the start comes
    /// from `--from`, or `--last` counted back from the end, or the
    /// configured default window.
    pub fn window(
        &self,
        default_window: Duration,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), HistoryError> {
        let end = match &self.to {
            Some(raw) => util::parse_time(raw)?,
            None => Utc::now(),
        };

        let start = match (&self.from, &self.last) {
            (Some(raw), _) => util::parse_time(raw)?,
            (None, Some(raw)) => {
                let span = humantime::parse_duration(raw).map_err(|e| {
                    HistoryError::Validation(format!("bad duration '{raw}': {e}"))
                })?;
                back_from(end, span)?
            }
            (None, None) => back_from(end, default_window)?,
        };

        Ok((start, end))
    }
}

fn back_from(end: DateTime<Utc>, span: Duration) -> Result<DateTime<Utc>, HistoryError> {
    let span = chrono::Duration::from_std(span)
        .map_err(|_| HistoryError::Validation("window length too large".to_string()))?;

    end.checked_sub_signed(span).ok_or_else(|| {
        HistoryError::Validation("window start before representable time".to_string())
    })
}

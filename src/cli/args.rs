use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use crate::models::{IslamicDayKey, PrayerName};

/// About ten years of history.
const MAX_HISTORY_DAYS: i64 = 3660;

#[derive(Parser, Debug)]
#[command(
    name = "salati",
    version,
    author,
    about = "Prayer times, countdowns and completion tracking in the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current Islamic day's prayer times and the active countdown
    Times {
        /// Resolve as if it were this local time (yyyy-MM-ddTHH:MM)
        #[arg(long, value_parser = parse_local_datetime)]
        at: Option<NaiveDateTime>,
    },
    /// Mark a prayer as completed for the current Islamic day
    Mark {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: PrayerName,
        /// Clear the completion instead of setting it
        #[arg(long)]
        undo: bool,
        /// Islamic day key to mark (yyyy-MM-dd, the date of its opening Fajr)
        #[arg(long)]
        day: Option<IslamicDayKey>,
    },
    /// Show completed prayers per Islamic day
    History {
        /// Number of days to show, ending today
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=MAX_HISTORY_DAYS)
        )]
        days: u32,
    },
    /// Dump every completion record as JSON to stdout
    Export,
    /// Show the config file path and effective settings
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
        /// Drop all cached prayer timings
        #[arg(long)]
        clear_cache: bool,
    },
}

fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map_err(|e| format!("expected yyyy-MM-ddTHH:MM: {}", e))
}

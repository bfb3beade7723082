use thiserror::Error;

use crate::models::PrayerName;

/// Why a timings source could not produce times for a date.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("timings API returned status {0}")]
    Status(u16),

    #[error("malformed timing data: {0}")]
    Malformed(String),

    #[error("prayer calculation failed: {0}")]
    Calculation(String),

    #[error("timings cache: {0}")]
    Cache(#[from] rusqlite::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("expected 6 schedule entries, got {0}")]
    WrongLength(usize),

    #[error("{earlier:?} is not before {later:?}")]
    OutOfOrder { earlier: PrayerName, later: PrayerName },

    #[error("last entry is not the closing Fajr")]
    MissingBoundary,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

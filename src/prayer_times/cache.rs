use chrono::NaiveDate;
use log::{debug, warn};
use rusqlite::Connection;

use crate::db::repository::CacheRepo;
use crate::error::SourceError;
use crate::models::RawPrayerTimes;
use crate::prayer_times::TimingsSource;

/// Serves times from `timings_cache` when present, otherwise asks `inner`
/// and remembers the answer. Rows are scoped to `source`, the fingerprint of
/// the settings behind `inner`.
pub struct CachingSource<'a, S> {
    conn: &'a Connection,
    source: String,
    inner: S,
}

impl<'a, S: TimingsSource> CachingSource<'a, S> {
    pub fn new(conn: &'a Connection, source: impl Into<String>, inner: S) -> Self {
        Self {
            conn,
            source: source.into(),
            inner,
        }
    }
}

impl<S: TimingsSource> TimingsSource for CachingSource<'_, S> {
    fn fetch_timings(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError> {
        let date_str = date.format("%Y-%m-%d").to_string();

        if let Some(cached) = CacheRepo::get_times_for_date(self.conn, &self.source, &date_str)? {
            debug!("timings cache hit for {}", date_str);
            return Ok(cached);
        }

        let times = self.inner.fetch_timings(date)?;
        // A cache write failure should not cost us the fresh answer.
        if let Err(e) = CacheRepo::store_times(self.conn, &self.source, &date_str, &times) {
            warn!("could not cache timings for {}: {}", date_str, e);
        }
        Ok(times)
    }
}

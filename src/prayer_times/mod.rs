pub mod aladhan;
pub mod cache;
pub mod calculator;
pub mod resolver;
pub mod timing;

use chrono::{Local, NaiveDate, NaiveDateTime};
use log::warn;
use rusqlite::Connection;

use crate::config::{AppConfig, SourceKind};
use crate::error::SourceError;
use crate::models::RawPrayerTimes;

pub use aladhan::AladhanClient;
pub use cache::CachingSource;
pub use calculator::PrayerCalculator;
pub use resolver::{resolve, ResolvedDay};
pub use timing::tick;

/// Anything that can hand back the five daily times for a calendar date.
pub trait TimingsSource {
    fn fetch_timings(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError>;
}

impl<T: TimingsSource + ?Sized> TimingsSource for Box<T> {
    fn fetch_timings(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError> {
        (**self).fetch_timings(date)
    }
}

impl<T: TimingsSource + ?Sized> TimingsSource for &T {
    fn fetch_timings(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError> {
        (**self).fetch_timings(date)
    }
}

/// Build the configured upstream source, without caching.
pub fn source_from_config(config: &AppConfig) -> Result<Box<dyn TimingsSource>, SourceError> {
    match config.source.kind {
        SourceKind::Aladhan => Ok(Box::new(AladhanClient::new(
            &config.source.base_url,
            config.location.latitude,
            config.location.longitude,
            config.source.method,
            config.source.timeout_secs,
        )?)),
        SourceKind::Offline => Ok(Box::new(PrayerCalculator::new(
            config.location.latitude,
            config.location.longitude,
            &config.source.calc_method,
            &config.source.madhab,
            config.source.timezone_offset,
        )?)),
    }
}

/// Resolve the Islamic day at `now` from the configured source. The cache
/// connection is used only when caching is switched on.
pub fn resolve_configured(
    config: &AppConfig,
    cache: Option<&Connection>,
    now: NaiveDateTime,
) -> ResolvedDay {
    let upstream = match source_from_config(config) {
        Ok(source) => source,
        Err(e) => {
            warn!("prayer time source misconfigured: {}", e);
            return ResolvedDay::unavailable();
        }
    };

    match cache.filter(|_| config.source.cache) {
        Some(conn) => resolve(
            now,
            &CachingSource::new(conn, config.source_fingerprint(), upstream),
        ),
        None => resolve(now, &upstream),
    }
}

/// Wall-clock time in the system's local timezone.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::NaiveDate;

    fn offline(latitude: f64, longitude: f64, timezone_offset: i32) -> AppConfig {
        let mut config = AppConfig::default();
        config.source.kind = SourceKind::Offline;
        config.location.latitude = latitude;
        config.location.longitude = longitude;
        config.source.timezone_offset = timezone_offset;
        config
    }

    #[test]
    fn moving_location_does_not_reuse_cached_times() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();

        let cairo = offline(30.0444, 31.2357, 120);
        let jakarta = offline(-6.2, 106.8, 420);

        let cairo_day = resolve_configured(&cairo, Some(&conn), now);
        assert!(cairo_day.is_available());

        let cached = resolve_configured(&jakarta, Some(&conn), now);
        let fresh = resolve_configured(&jakarta, None, now);
        assert!(fresh.is_available());
        assert_eq!(cached, fresh);
        assert_ne!(cached.schedule, cairo_day.schedule);
    }

    #[test]
    fn cache_switch_off_skips_the_table() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let mut config = offline(30.0444, 31.2357, 120);
        config.source.cache = false;
        let now = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();

        assert!(resolve_configured(&config, Some(&conn), now).is_available());
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM timings_cache", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }
}

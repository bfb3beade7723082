//! Islamic-day resolution.
//!
//! An Islamic day runs from one Fajr to the next, so between midnight and
//! Fajr the day on screen is still yesterday's. The resolver decides which
//! calendar date opens the current day, fetches its times and anchors each
//! entry to a full timestamp.

use chrono::{Duration, NaiveDateTime};
use log::{info, warn};

use crate::error::ResolveError;
use crate::models::{IslamicDayKey, PrayerSchedule};
use crate::prayer_times::TimingsSource;

/// The outcome of one resolution pass. An empty schedule with no key means
/// "unavailable", never "no prayers today".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDay {
    pub day_key: Option<IslamicDayKey>,
    pub schedule: PrayerSchedule,
}

impl ResolvedDay {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.day_key.is_some() && !self.schedule.is_empty()
    }
}

/// Resolve the Islamic day containing `now`, absorbing failures into an
/// unavailable day.
pub fn resolve<S: TimingsSource + ?Sized>(now: NaiveDateTime, source: &S) -> ResolvedDay {
    match try_resolve(now, source) {
        Ok((day_key, schedule)) => {
            info!("resolved Islamic day {} at {}", day_key, now);
            ResolvedDay {
                day_key: Some(day_key),
                schedule,
            }
        }
        Err(e) => {
            warn!("prayer times unavailable: {}", e);
            ResolvedDay::unavailable()
        }
    }
}

pub fn try_resolve<S: TimingsSource + ?Sized>(
    now: NaiveDateTime,
    source: &S,
) -> Result<(IslamicDayKey, PrayerSchedule), ResolveError> {
    let today = now.date();
    let yesterday = today - Duration::days(1);

    let today_raw = source.fetch_timings(today)?;
    let today_fajr = today.and_time(today_raw.fajr);

    let (target, target_raw) = if now < today_fajr {
        (yesterday, source.fetch_timings(yesterday)?)
    } else {
        (today, today_raw)
    };
    let day_key = IslamicDayKey::from_fajr_date(target);

    let next_fajr = if target == today {
        source.fetch_timings(today + Duration::days(1))?.fajr
    } else {
        // yesterday's closing Fajr is the one already fetched for today
        today_raw.fajr
    };

    let schedule = PrayerSchedule::anchored(day_key.fajr_date(), &target_raw, next_fajr)?;
    Ok((day_key, schedule))
}

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ScheduleError;
use crate::models::{PrayerName, PrayerTime};

/// Key of an Islamic day: the calendar date of the Fajr that opens it.
///
/// Every completion read and write goes through one of these, taken from the
/// resolved day that is on screen. It is never rebuilt from the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IslamicDayKey(NaiveDate);

impl IslamicDayKey {
    pub fn from_fajr_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn fajr_date(&self) -> NaiveDate {
        self.0
    }

    pub fn as_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for IslamicDayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for IslamicDayKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Bad day key '{}': {}", s, e))?;
        Ok(Self(date))
    }
}

/// Bare time-of-day strings for one calendar date, as a timings source
/// returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPrayerTimes {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl RawPrayerTimes {
    pub fn time_of(&self, name: PrayerName) -> NaiveTime {
        match name {
            PrayerName::Fajr | PrayerName::NextFajr => self.fajr,
            PrayerName::Dhuhr => self.dhuhr,
            PrayerName::Asr => self.asr,
            PrayerName::Maghrib => self.maghrib,
            PrayerName::Isha => self.isha,
        }
    }
}

/// The six ordered entries of one Islamic day, or nothing while the day is
/// loading or unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrayerSchedule {
    entries: Vec<PrayerTime>,
}

impl PrayerSchedule {
    pub const LEN: usize = 6;

    pub fn empty() -> Self {
        Self::default()
    }

    /// Anchor the day's raw times to `day` and the boundary Fajr to the day
    /// after it.
    pub fn anchored(
        day: NaiveDate,
        today: &RawPrayerTimes,
        next_fajr: NaiveTime,
    ) -> Result<Self, ScheduleError> {
        let next_day = day + Duration::days(1);
        let entries = PrayerName::daily()
            .into_iter()
            .map(|name| (name, today.time_of(name)))
            .chain(std::iter::once((PrayerName::NextFajr, next_fajr)))
            .map(|(name, time)| {
                let date = if name.belongs_to_next_day() { next_day } else { day };
                PrayerTime::new(name, date.and_time(time))
            })
            .collect();
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<PrayerTime>) -> Result<Self, ScheduleError> {
        if entries.len() != Self::LEN {
            return Err(ScheduleError::WrongLength(entries.len()));
        }
        for pair in entries.windows(2) {
            if pair[0].time >= pair[1].time {
                return Err(ScheduleError::OutOfOrder {
                    earlier: pair[0].name,
                    later: pair[1].name,
                });
            }
        }
        if !entries[Self::LEN - 1].name.is_boundary() {
            return Err(ScheduleError::MissingBoundary);
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PrayerTime] {
        &self.entries
    }

    /// Entries shown as cards: everything but the boundary.
    pub fn display(&self) -> &[PrayerTime] {
        match self.entries.split_last() {
            Some((last, rest)) if last.name.is_boundary() => rest,
            _ => &self.entries,
        }
    }

    pub fn boundary(&self) -> Option<&PrayerTime> {
        self.entries.last().filter(|p| p.name.is_boundary())
    }

    pub fn get(&self, name: PrayerName) -> Option<&PrayerTime> {
        self.entries.iter().find(|p| p.name == name)
    }

    /// Whether `now` has already run past the closing Fajr.
    pub fn has_ended(&self, now: NaiveDateTime) -> bool {
        self.boundary().is_some_and(|b| now >= b.time)
    }
}

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use salah::prelude::{Configuration, Coordinates, Madhab, Method, Prayer};

use crate::error::SourceError;
use crate::models::RawPrayerTimes;
use crate::prayer_times::TimingsSource;

/// Offline source: computes times locally with the `salah` crate.
pub struct PrayerCalculator {
    pub lat: f64,
    pub lng: f64,
    pub method_str: String,
    pub madhab_str: String,
    pub tz_offset_minutes: i32,
}

impl PrayerCalculator {
    pub fn new(
        lat: f64,
        lng: f64,
        method: &str,
        madhab: &str,
        tz_offset_minutes: i32,
    ) -> Result<Self, SourceError> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            lat,
            lng,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            tz_offset_minutes,
        })
    }

    fn compute_times(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError> {
        let coords = Coordinates::new(self.lat, self.lng);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = salah::prelude::PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| SourceError::Calculation(e.to_string()))?;

        let offset = FixedOffset::east_opt(self.tz_offset_minutes * 60).ok_or_else(|| {
            SourceError::Calculation(format!("Invalid timezone offset: {}", self.tz_offset_minutes))
        })?;

        let to_local = |utc: chrono::DateTime<chrono::Utc>| -> NaiveTime {
            utc.with_timezone(&offset).time()
        };

        Ok(RawPrayerTimes {
            fajr: to_local(times.time(Prayer::Fajr)),
            dhuhr: to_local(times.time(Prayer::Dhuhr)),
            asr: to_local(times.time(Prayer::Asr)),
            maghrib: to_local(times.time(Prayer::Maghrib)),
            isha: to_local(times.time(Prayer::Isha)),
        })
    }
}

impl TimingsSource for PrayerCalculator {
    fn fetch_timings(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError> {
        self.compute_times(date)
    }
}

fn parse_method(s: &str) -> Result<Method, SourceError> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(SourceError::Calculation(format!("Unknown calculation method: '{}'", s))),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab, SourceError> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(SourceError::Calculation(format!("Unknown madhab: '{}'", s))),
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The six labels a schedule entry can carry. `NextFajr` is the boundary
/// entry: tomorrow's Fajr, which only closes the Isha window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    NextFajr,
}

impl PrayerName {
    /// The five prayers shown and tracked for a day, in order.
    pub fn daily() -> [PrayerName; 5] {
        [
            PrayerName::Fajr,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
            PrayerName::NextFajr => "next_fajr",
        }
    }

    /// Arabic label. The boundary entry reads as plain Fajr.
    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr | PrayerName::NextFajr => "الفجر",
            PrayerName::Dhuhr => "الظهر",
            PrayerName::Asr => "العصر",
            PrayerName::Maghrib => "المغرب",
            PrayerName::Isha => "العشاء",
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, PrayerName::NextFajr)
    }

    /// Entries whose time belongs to the calendar day after the Islamic day's
    /// Fajr date.
    pub fn belongs_to_next_day(&self) -> bool {
        self.is_boundary()
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" | "الفجر" => Ok(PrayerName::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" | "الظهر" => Ok(PrayerName::Dhuhr),
            "asr" | "العصر" => Ok(PrayerName::Asr),
            "maghrib" | "المغرب" => Ok(PrayerName::Maghrib),
            "isha" | "العشاء" => Ok(PrayerName::Isha),
            "next_fajr" => Ok(PrayerName::NextFajr),
            _ => Err(anyhow::anyhow!("Unknown prayer: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTime {
    pub name: PrayerName,
    pub time: NaiveDateTime,
}

impl PrayerTime {
    pub fn new(name: PrayerName, time: NaiveDateTime) -> Self {
        Self { name, time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_label_reads_as_fajr() {
        assert_eq!(PrayerName::NextFajr.display_name(), PrayerName::Fajr.display_name());
        assert!(PrayerName::NextFajr.is_boundary());
        assert!(!PrayerName::Isha.is_boundary());
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("Zuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!("dhuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!("المغرب".parse::<PrayerName>().unwrap(), PrayerName::Maghrib);
        assert!("witr".parse::<PrayerName>().is_err());
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for name in PrayerName::daily() {
            assert_eq!(name.as_str().parse::<PrayerName>().unwrap(), name);
        }
    }
}

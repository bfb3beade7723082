use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

use crate::models::IslamicDayKey;

/// Islamic month names (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "محرم",
    "صفر",
    "ربيع الأول",
    "ربيع الآخر",
    "جمادى الأولى",
    "جمادى الآخرة",
    "رجب",
    "شعبان",
    "رمضان",
    "شوال",
    "ذو القعدة",
    "ذو الحجة",
];

fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "?"
    }
}

pub struct HijriInfo {
    pub day: usize,
    pub month: usize,
    pub year: usize,
    pub month_name: &'static str,
}

impl HijriInfo {
    pub fn formatted(&self) -> String {
        format!("{} {} {} هـ", self.day, self.month_name, self.year)
    }
}

pub fn to_hijri(date: NaiveDate) -> Result<HijriInfo> {
    let hd = HijriDate::from_gr(
        date.year() as usize,
        date.month() as usize,
        date.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    let month = hd.month();
    Ok(HijriInfo {
        day: hd.day(),
        month,
        year: hd.year(),
        month_name: hijri_month_name(month),
    })
}

/// Hijri date for the Fajr date of `key`, shifted by `offset_days` for local
/// moon sighting. Empty when the shifted date or the conversion is out of
/// range.
pub fn hijri_for_day(key: IslamicDayKey, offset_days: i32) -> String {
    key.fajr_date()
        .checked_add_signed(Duration::days(i64::from(offset_days)))
        .and_then(|adjusted| to_hijri(adjusted).ok())
        .map(|h| h.formatted())
        .unwrap_or_default()
}

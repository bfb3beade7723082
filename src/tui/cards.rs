//! Render model: what each prayer card and the summary panel show.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{ActiveTiming, PrayerName, PrayerSchedule, TimingKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerCard {
    pub name: PrayerName,
    pub time: NaiveDateTime,
    pub is_next: bool,
    pub is_completed: bool,
    /// The prayer's time has come, so it can be marked.
    pub is_enabled: bool,
    pub remaining_text: Option<String>,
    pub elapsed_text: Option<String>,
}

/// One card per displayable entry; the closing Fajr gets none.
pub fn build_cards(
    schedule: &PrayerSchedule,
    timing: Option<&ActiveTiming>,
    completed: &HashSet<PrayerName>,
    now: NaiveDateTime,
) -> Vec<PrayerCard> {
    schedule
        .display()
        .iter()
        .map(|p| {
            let active = timing.filter(|t| t.prayer == p.name);
            let text_for = |kind| {
                active
                    .filter(|t| t.kind == kind)
                    .map(|t| t.duration_text.clone())
            };
            PrayerCard {
                name: p.name,
                time: p.time,
                is_next: active.is_some_and(|t| t.is_remaining()),
                is_completed: completed.contains(&p.name),
                is_enabled: now >= p.time,
                remaining_text: text_for(TimingKind::Remaining),
                elapsed_text: text_for(TimingKind::Elapsed),
            }
        })
        .collect()
}

/// The global "next prayer" line, shown only while counting down.
pub fn next_summary(timing: Option<&ActiveTiming>) -> Option<(&'static str, &str)> {
    timing
        .filter(|t| t.is_remaining())
        .map(|t| (t.prayer.display_name(), t.duration_text.as_str()))
}

use chrono::{Duration, NaiveDateTime};

use crate::models::{ActiveTiming, PrayerName, PrayerSchedule, TimingKind};
use crate::utils::format::format_duration_ar;

/// How long after a prayer starts it keeps showing as "in progress".
pub const ELAPSED_WINDOW_MINUTES: i64 = 25;

/// Work out what the countdown panel shows at `now`.
///
/// A prayer that started less than [`ELAPSED_WINDOW_MINUTES`] ago wins over the
/// countdown to the next one. The closing Fajr never shows as elapsed.
pub fn tick(schedule: &PrayerSchedule, now: NaiveDateTime) -> Option<ActiveTiming> {
    let entries = schedule.entries();
    let current = entries.iter().rev().find(|p| p.time <= now);
    let next = entries.iter().find(|p| p.time > now);

    if let Some(current) = current {
        let since = now - current.time;
        if !current.name.is_boundary() && since < Duration::minutes(ELAPSED_WINDOW_MINUTES) {
            return Some(timing(current.name, TimingKind::Elapsed, since));
        }
    }

    next.map(|next| timing(next.name, TimingKind::Remaining, next.time - now))
}

fn timing(prayer: PrayerName, kind: TimingKind, span: Duration) -> ActiveTiming {
    let seconds = span.num_seconds().max(0);
    ActiveTiming {
        prayer,
        kind,
        seconds,
        duration_text: format_duration_ar(seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPrayerTimes;
    use chrono::{NaiveDate, NaiveTime};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn schedule() -> PrayerSchedule {
        let raw = RawPrayerTimes {
            fajr: t(5, 0),
            dhuhr: t(12, 0),
            asr: t(15, 30),
            maghrib: t(18, 10),
            isha: t(19, 40),
        };
        PrayerSchedule::anchored(day(), &raw, t(5, 0)).unwrap()
    }

    #[test]
    fn fajr_is_elapsed_ten_minutes_in() {
        let timing = tick(&schedule(), day().and_time(t(5, 10))).unwrap();
        assert_eq!(timing.prayer, PrayerName::Fajr);
        assert_eq!(timing.prayer.display_name(), "الفجر");
        assert_eq!(timing.kind, TimingKind::Elapsed);
        assert_eq!(timing.duration_text, "10 دقائق");
    }

    #[test]
    fn after_the_window_dhuhr_counts_down() {
        let timing = tick(&schedule(), day().and_time(t(5, 40))).unwrap();
        assert_eq!(timing.prayer, PrayerName::Dhuhr);
        assert_eq!(timing.prayer.display_name(), "الظهر");
        assert_eq!(timing.kind, TimingKind::Remaining);
        assert_eq!(timing.seconds, 6 * 3600 + 20 * 60);
    }

    #[test]
    fn window_closes_at_exactly_twenty_five_minutes() {
        let just_before = day().and_time(NaiveTime::from_hms_opt(12, 24, 59).unwrap());
        let inside = tick(&schedule(), just_before).unwrap();
        assert!(inside.is_elapsed());
        let edge = tick(&schedule(), day().and_time(t(12, 25))).unwrap();
        assert!(edge.is_remaining());
        assert_eq!(edge.prayer, PrayerName::Asr);
    }

    #[test]
    fn at_the_start_instant_prayer_has_arrived() {
        let timing = tick(&schedule(), day().and_time(t(15, 30))).unwrap();
        assert_eq!(timing.prayer, PrayerName::Asr);
        assert!(timing.is_elapsed());
        assert_eq!(timing.duration_text, "حان الآن");
    }

    #[test]
    fn after_isha_counts_down_to_closing_fajr_as_plain_fajr() {
        let timing = tick(&schedule(), day().and_time(t(23, 0))).unwrap();
        assert_eq!(timing.prayer, PrayerName::NextFajr);
        assert_eq!(timing.prayer.display_name(), "الفجر");
        assert!(timing.is_remaining());
        assert_eq!(timing.seconds, 6 * 3600);
    }

    #[test]
    fn closing_fajr_never_shows_elapsed() {
        let after_end = (day() + Duration::days(1)).and_time(t(5, 5));
        assert_eq!(tick(&schedule(), after_end), None);
    }

    #[test]
    fn before_first_entry_counts_down_to_fajr() {
        let timing = tick(&schedule(), day().and_time(t(4, 0))).unwrap();
        assert_eq!(timing.prayer, PrayerName::Fajr);
        assert!(timing.is_remaining());
        assert_eq!(timing.duration_text, "1 ساعة");
    }

    #[test]
    fn empty_schedule_has_no_timing() {
        assert_eq!(tick(&PrayerSchedule::empty(), day().and_time(t(9, 0))), None);
    }

    #[test]
    fn never_both_kinds_over_a_whole_day() {
        let schedule = schedule();
        let mut now = day().and_time(t(0, 0));
        let end = (day() + Duration::days(1)).and_time(t(6, 0));
        while now < end {
            if let Some(timing) = tick(&schedule, now) {
                assert_ne!(timing.is_elapsed(), timing.is_remaining());
            }
            now += Duration::minutes(7);
        }
    }
}

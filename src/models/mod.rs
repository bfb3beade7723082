pub mod prayer;
pub mod schedule;
pub mod timing;

pub use prayer::{PrayerName, PrayerTime};
pub use schedule::{IslamicDayKey, PrayerSchedule, RawPrayerTimes};
pub use timing::{ActiveTiming, CompletionRecord, TimingKind};

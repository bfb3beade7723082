use serde::{Deserialize, Serialize};

use crate::models::{IslamicDayKey, PrayerName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingKind {
    Elapsed,
    Remaining,
}

/// What the countdown panel shows for the current second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTiming {
    pub prayer: PrayerName,
    pub kind: TimingKind,
    pub seconds: i64,
    pub duration_text: String,
}

impl ActiveTiming {
    pub fn is_elapsed(&self) -> bool {
        self.kind == TimingKind::Elapsed
    }

    pub fn is_remaining(&self) -> bool {
        self.kind == TimingKind::Remaining
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub prayer: PrayerName,
    pub day_key: IslamicDayKey,
    pub completed: bool,
}

use chrono::NaiveDateTime;
use unicode_width::UnicodeWidthStr;

/// Shown instead of an empty duration.
pub const ARRIVED_NOW: &str = "حان الآن";
const AND: &str = " و ";

/// Arabic word forms for one unit: singular, dual, plural.
struct Unit {
    singular: &'static str,
    dual: &'static str,
    plural: &'static str,
}

const HOUR: Unit = Unit {
    singular: "ساعة",
    dual: "ساعتان",
    plural: "ساعات",
};

const MINUTE: Unit = Unit {
    singular: "دقيقة",
    dual: "دقيقتان",
    plural: "دقائق",
};

const SECOND: Unit = Unit {
    singular: "ثانية",
    dual: "ثانيتان",
    plural: "ثوان",
};

impl Unit {
    /// Dual for exactly 2, plural for 3 through 10, singular otherwise
    /// (Arabic counted nouns above ten take the singular).
    fn word(&self, n: i64) -> &'static str {
        match n {
            2 => self.dual,
            3..=10 => self.plural,
            _ => self.singular,
        }
    }
}

/// Format a duration in seconds as Arabic text, e.g. "1 ساعة و 5 دقائق".
pub fn format_duration_ar(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let parts: Vec<String> = [(hours, &HOUR), (minutes, &MINUTE), (seconds, &SECOND)]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{} {}", n, unit.word(n)))
        .collect();

    if parts.is_empty() {
        ARRIVED_NOW.to_string()
    } else {
        parts.join(AND)
    }
}

/// Format seconds as a "HH:MM:SS" clock face.
pub fn format_clock(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format a timestamp's time of day as "HH:MM"
pub fn format_time(t: NaiveDateTime) -> String {
    t.format("%H:%M").to_string()
}

/// Right-pad `s` to `width` terminal columns. Arabic labels are measured by
/// display width, not bytes.
pub fn pad_display(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

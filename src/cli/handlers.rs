use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::info;
use rusqlite::Connection;
use std::collections::HashMap;

use crate::config::{AppConfig, SourceKind};
use crate::db::repository::{CacheRepo, CompletionRepo};
use crate::db::store::{completed_for_day, set_completed, CompletionStore};
use crate::models::{IslamicDayKey, PrayerName};
use crate::prayer_times::{local_now, resolve_configured, tick};
use crate::tui::cards::{build_cards, next_summary};
use crate::utils::format::{format_time, pad_display};
use crate::utils::hijri::hijri_for_day;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(
    conn: &Connection,
    config: &AppConfig,
    at: Option<NaiveDateTime>,
) -> Result<()> {
    let now = at.unwrap_or_else(local_now);
    let day = resolve_configured(config, Some(conn), now);

    let Some(day_key) = day.day_key else {
        println_colored!(RED, "  Prayer times are unavailable right now. Try again later.");
        return Ok(());
    };

    let timing = tick(&day.schedule, now);
    let completed = completed_for_day(&CompletionRepo::new(conn), day_key)?;
    let cards = build_cards(&day.schedule, timing.as_ref(), &completed, now);

    println!();
    println_colored!(
        GOLD,
        "  {}  ·  {}  ({})",
        config.location.name,
        hijri_for_day(day_key, config.display.hijri_offset),
        day_key
    );
    println!();

    for card in &cards {
        let mark = if card.is_completed { "●" } else { "○" };
        let line = format!(
            "  {}  {}  {}",
            mark,
            pad_display(card.name.display_name(), 8),
            format_time(card.time)
        );
        if let Some(text) = &card.elapsed_text {
            println_colored!(GREEN, "{}   منذ {}", line, text);
        } else if card.is_next {
            println_colored!(BOLD, "{}", line);
        } else if card.is_enabled {
            println!("{}", line);
        } else {
            println_colored!(DIM, "{}", line);
        }
    }

    if let Some((name, text)) = next_summary(timing.as_ref()) {
        println!();
        println_colored!(AMBER, "  {} بعد {}", name, text);
    }
    println!();
    Ok(())
}

// ─── Mark prayer ─────────────────────────────────────────────────────────────

pub fn handle_mark(
    conn: &Connection,
    config: &AppConfig,
    prayer: PrayerName,
    undo: bool,
    day: Option<IslamicDayKey>,
) -> Result<()> {
    if prayer.is_boundary() {
        bail!("Unknown prayer '{}'. Use: fajr, dhuhr, asr, maghrib, isha", prayer.as_str());
    }

    let day_key = match day {
        Some(key) => key,
        None => current_day_for_marking(conn, config, prayer, undo)?,
    };

    set_completed(&CompletionRepo::new(conn), prayer, !undo, day_key)?;
    info!("{} on {} set to {}", prayer.as_str(), day_key, !undo);

    if undo {
        println_colored!(AMBER, "  ○ {} cleared for {}", prayer.display_name(), day_key);
    } else {
        println_colored!(GREEN, "  ✓ {} marked as done for {}", prayer.display_name(), day_key);
    }
    Ok(())
}

/// The day key shown right now. A prayer that has not come yet cannot be
/// marked done.
fn current_day_for_marking(
    conn: &Connection,
    config: &AppConfig,
    prayer: PrayerName,
    undo: bool,
) -> Result<IslamicDayKey> {
    let now = local_now();
    let day = resolve_configured(config, Some(conn), now);
    let Some(day_key) = day.day_key else {
        bail!(
            "Prayer times are unavailable, so the current day is unknown. Pass --day yyyy-MM-dd."
        );
    };

    if !undo {
        if let Some(entry) = day.schedule.get(prayer) {
            if now < entry.time {
                bail!(
                    "{} has not come yet (at {})",
                    prayer.display_name(),
                    format_time(entry.time)
                );
            }
        }
    }
    Ok(day_key)
}

// ─── History ─────────────────────────────────────────────────────────────────

pub fn handle_history(conn: &Connection, days: u32) -> Result<()> {
    handle_history_until(conn, local_now().date(), days)
}

fn handle_history_until(conn: &Connection, today: NaiveDate, days: u32) -> Result<()> {
    let days = days.max(1);
    let first = today
        .checked_sub_signed(Duration::days(i64::from(days) - 1))
        .with_context(|| format!("{} days back from {} is out of range", days, today))?;
    let from = IslamicDayKey::from_fajr_date(first);
    let to = IslamicDayKey::from_fajr_date(today);

    let tallies: HashMap<IslamicDayKey, u8> = CompletionRepo::new(conn)
        .tally_range(from, to)?
        .into_iter()
        .map(|t| (t.day_key, t.done))
        .collect();

    println!();
    println_colored!(GOLD, "  Completed prayers, last {} days", days);
    println!();

    for offset in 0..i64::from(days) {
        let key = IslamicDayKey::from_fajr_date(first + Duration::days(offset));
        let done = tallies.get(&key).copied().unwrap_or(0);
        let bar = format!("{}{}", "█".repeat(done as usize), "░".repeat(5 - done as usize));
        let color = match done {
            5 => GREEN,
            1..=4 => AMBER,
            _ => DIM,
        };
        println_colored!(color, "  {}  {}/5  {}", key, done, bar);
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection) -> Result<()> {
    let records = CompletionRepo::new(conn).list()?;
    let json = serde_json::to_string_pretty(&records).context("Serializing completions")?;
    println!("{}", json);
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(
    conn: &Connection,
    config: &AppConfig,
    init: bool,
    clear_cache: bool,
) -> Result<()> {
    let path = AppConfig::config_path()?;

    if init {
        if path.exists() {
            println_colored!(DIM, "  Config already exists at {}", path.display());
        } else {
            let written = config.save()?;
            println_colored!(GREEN, "  ✓ Wrote default config to {}", written.display());
        }
    }

    if clear_cache {
        let removed = CacheRepo::clear_all(conn).context("Clearing timings cache")?;
        println_colored!(GREEN, "  ✓ Removed {} cached day(s)", removed);
    }

    println!();
    println_colored!(GOLD, "  Config: {}", path.display());
    println_colored!(DIM, "  Data:   {}", AppConfig::db_path()?.display());
    println!();
    println_colored!(BOLD, "  Location");
    println!(
        "    {}  ({}, {})",
        config.location.name, config.location.latitude, config.location.longitude
    );
    println_colored!(BOLD, "  Source");
    match config.source.kind {
        SourceKind::Aladhan => println!(
            "    aladhan  {}  method {}  timeout {}s",
            config.source.base_url, config.source.method, config.source.timeout_secs
        ),
        SourceKind::Offline => println!(
            "    offline  {}  {}  UTC{:+}min",
            config.source.calc_method, config.source.madhab, config.source.timezone_offset
        ),
    }
    println!("    cache    {}", if config.source.cache { "on" } else { "off" });
    println_colored!(BOLD, "  Display");
    println!("    hijri offset {} day(s)", config.display.hijri_offset);
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn history_past_the_calendar_is_an_error() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let err = handle_history_until(&conn(), today, u32::MAX).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn history_within_range_succeeds() {
        let conn = conn();
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        set_completed(
            &CompletionRepo::new(&conn),
            PrayerName::Fajr,
            true,
            IslamicDayKey::from_fajr_date(today),
        )
        .unwrap();
        assert!(handle_history_until(&conn, today, 7).is_ok());
        assert!(handle_history_until(&conn, today, 0).is_ok());
    }
}

use anyhow::Result;
use chrono::NaiveTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::db::store::CompletionStore;
use crate::models::{CompletionRecord, IslamicDayKey, PrayerName, RawPrayerTimes};

fn parse_time(idx: usize, s: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── Cached prayer times ────────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    /// `source` identifies the settings that produced the times; rows written
    /// under other settings are never returned.
    pub fn get_times_for_date(
        conn: &Connection,
        source: &str,
        date: &str,
    ) -> rusqlite::Result<Option<RawPrayerTimes>> {
        conn.query_row(
            "SELECT fajr, dhuhr, asr, maghrib, isha FROM timings_cache
             WHERE source = ?1 AND date = ?2",
            params![source, date],
            |row| {
                Ok(RawPrayerTimes {
                    fajr: parse_time(0, &row.get::<_, String>(0)?)?,
                    dhuhr: parse_time(1, &row.get::<_, String>(1)?)?,
                    asr: parse_time(2, &row.get::<_, String>(2)?)?,
                    maghrib: parse_time(3, &row.get::<_, String>(3)?)?,
                    isha: parse_time(4, &row.get::<_, String>(4)?)?,
                })
            },
        )
        .optional()
    }

    pub fn clear_all(conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute("DELETE FROM timings_cache", [])
    }

    pub fn store_times(
        conn: &Connection,
        source: &str,
        date: &str,
        times: &RawPrayerTimes,
    ) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO timings_cache (source, date, fajr, dhuhr, asr, maghrib, isha)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                source,
                date,
                times.fajr.format("%H:%M").to_string(),
                times.dhuhr.format("%H:%M").to_string(),
                times.asr.format("%H:%M").to_string(),
                times.maghrib.format("%H:%M").to_string(),
                times.isha.format("%H:%M").to_string(),
            ],
        )?;
        Ok(())
    }
}

// ─── Completions ─────────────────────────────────────────────────────────────

/// Done-count for one Islamic day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTally {
    pub day_key: IslamicDayKey,
    pub done: u8,
}

pub struct CompletionRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CompletionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Completed prayers per day for keys in `from..=to`, oldest first.
    pub fn tally_range(&self, from: IslamicDayKey, to: IslamicDayKey) -> Result<Vec<DayTally>> {
        let mut stmt = self.conn.prepare(
            "SELECT day_key, SUM(completed) FROM completions
             WHERE day_key >= ?1 AND day_key <= ?2
             GROUP BY day_key ORDER BY day_key",
        )?;
        let rows = stmt.query_map(params![from.as_string(), to.as_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (day_key, done) = r?;
            result.push(DayTally {
                day_key: IslamicDayKey::from_str(&day_key)?,
                done: done.clamp(0, 5) as u8,
            });
        }
        Ok(result)
    }
}

impl CompletionStore for CompletionRepo<'_> {
    fn list(&self) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT prayer, day_key, completed FROM completions
             ORDER BY day_key, CASE prayer
               WHEN 'fajr' THEN 1 WHEN 'dhuhr' THEN 2 WHEN 'asr' THEN 3
               WHEN 'maghrib' THEN 4 WHEN 'isha' THEN 5 END",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (prayer, day_key, completed) = r?;
            result.push(CompletionRecord {
                prayer: PrayerName::from_str(&prayer)?,
                day_key: IslamicDayKey::from_str(&day_key)?,
                completed: completed != 0,
            });
        }
        Ok(result)
    }

    fn upsert(&self, prayer: PrayerName, completed: bool, day_key: IslamicDayKey) -> Result<()> {
        self.conn.execute(
            "INSERT INTO completions (prayer, day_key, completed) VALUES (?1, ?2, ?3)
             ON CONFLICT(prayer, day_key) DO UPDATE
             SET completed = ?3, updated_at = datetime('now')",
            params![prayer.as_str(), day_key.as_string(), completed as i32],
        )?;
        Ok(())
    }

    fn get(&self, prayer: PrayerName, day_key: IslamicDayKey) -> Result<Option<bool>> {
        let value = self
            .conn
            .query_row(
                "SELECT completed FROM completions WHERE prayer = ?1 AND day_key = ?2",
                params![prayer.as_str(), day_key.as_string()],
                |row| row.get::<_, i32>(0),
            )
            .optional()?;
        Ok(value.map(|v| v != 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::store::{completed_for_day, is_completed, set_completed};
    use chrono::NaiveDate;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn key(d: u32) -> IslamicDayKey {
        IslamicDayKey::from_fajr_date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
    }

    #[test]
    fn cache_round_trip() {
        let conn = conn();
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let times = RawPrayerTimes {
            fajr: t(4, 31),
            dhuhr: t(11, 55),
            asr: t(15, 10),
            maghrib: t(17, 52),
            isha: t(19, 9),
        };
        CacheRepo::store_times(&conn, "cairo", "2024-03-10", &times).unwrap();
        assert_eq!(
            CacheRepo::get_times_for_date(&conn, "cairo", "2024-03-10").unwrap(),
            Some(times)
        );
        assert_eq!(CacheRepo::get_times_for_date(&conn, "cairo", "2024-03-11").unwrap(), None);
        assert_eq!(CacheRepo::get_times_for_date(&conn, "jakarta", "2024-03-10").unwrap(), None);
        assert_eq!(CacheRepo::clear_all(&conn).unwrap(), 1);
    }

    #[test]
    fn corrupt_cache_row_is_an_error() {
        let conn = conn();
        conn.execute(
            "INSERT INTO timings_cache VALUES ('cairo', '2024-03-10', 'dawn', '11:55', '15:10', '17:52', '19:09')",
            [],
        )
        .unwrap();
        assert!(CacheRepo::get_times_for_date(&conn, "cairo", "2024-03-10").is_err());
    }

    #[test]
    fn upsert_overwrites_the_same_pair() {
        let conn = conn();
        let repo = CompletionRepo::new(&conn);
        set_completed(&repo, PrayerName::Maghrib, true, key(9)).unwrap();
        set_completed(&repo, PrayerName::Maghrib, false, key(9)).unwrap();
        let records = repo.list().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].completed);
    }

    #[test]
    fn lookup_depends_only_on_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salati.db");
        {
            let conn = Connection::open(&path).unwrap();
            run_migrations(&conn).unwrap();
            set_completed(&CompletionRepo::new(&conn), PrayerName::Isha, true, key(9)).unwrap();
        }
        // a later session, possibly on another calendar date
        let conn = Connection::open(&path).unwrap();
        let repo = CompletionRepo::new(&conn);
        assert!(is_completed(&repo, PrayerName::Isha, key(9)).unwrap());
        assert!(!is_completed(&repo, PrayerName::Isha, key(10)).unwrap());
    }

    #[test]
    fn list_is_ordered_by_day_then_prayer() {
        let conn = conn();
        let repo = CompletionRepo::new(&conn);
        set_completed(&repo, PrayerName::Isha, true, key(9)).unwrap();
        set_completed(&repo, PrayerName::Fajr, true, key(10)).unwrap();
        set_completed(&repo, PrayerName::Fajr, true, key(9)).unwrap();
        let order: Vec<_> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|r| (r.day_key, r.prayer))
            .collect();
        assert_eq!(
            order,
            vec![
                (key(9), PrayerName::Fajr),
                (key(9), PrayerName::Isha),
                (key(10), PrayerName::Fajr),
            ]
        );
        assert_eq!(completed_for_day(&repo, key(10)).unwrap().len(), 1);
    }

    #[test]
    fn tally_counts_only_completed() {
        let conn = conn();
        let repo = CompletionRepo::new(&conn);
        set_completed(&repo, PrayerName::Fajr, true, key(8)).unwrap();
        set_completed(&repo, PrayerName::Dhuhr, true, key(9)).unwrap();
        set_completed(&repo, PrayerName::Asr, true, key(9)).unwrap();
        set_completed(&repo, PrayerName::Isha, false, key(9)).unwrap();
        set_completed(&repo, PrayerName::Fajr, true, key(12)).unwrap();

        let tally = repo.tally_range(key(8), key(10)).unwrap();
        assert_eq!(
            tally,
            vec![
                DayTally { day_key: key(8), done: 1 },
                DayTally { day_key: key(9), done: 2 },
            ]
        );
    }
}

use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    drop_unkeyed_cache(conn)?;

    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS completions (
            prayer      TEXT NOT NULL CHECK(prayer IN ('fajr','dhuhr','asr','maghrib','isha')),
            day_key     TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            updated_at  TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (prayer, day_key)
        );

        CREATE TABLE IF NOT EXISTS timings_cache (
            source   TEXT NOT NULL,
            date     TEXT NOT NULL,
            fajr     TEXT NOT NULL,
            dhuhr    TEXT NOT NULL,
            asr      TEXT NOT NULL,
            maghrib  TEXT NOT NULL,
            isha     TEXT NOT NULL,
            PRIMARY KEY (source, date)
        );
    ")?;
    Ok(())
}

/// Early databases cached by date alone. Those rows cannot say which location
/// or method produced them, so the table is rebuilt.
fn drop_unkeyed_cache(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('timings_cache')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if !columns.is_empty() && !columns.iter().any(|c| c == "source") {
        conn.execute_batch("DROP TABLE timings_cache;")?;
    }
    Ok(())
}

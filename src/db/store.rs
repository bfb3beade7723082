//! Completion tracking.
//!
//! Reads and writes are keyed on the [`IslamicDayKey`] of the resolved day on
//! screen. Callers pass that key through; nothing here looks at the clock.

use anyhow::{bail, Result};
use std::collections::HashSet;

use crate::models::{CompletionRecord, IslamicDayKey, PrayerName};

/// Keyed store of "prayer done" flags.
pub trait CompletionStore {
    fn list(&self) -> Result<Vec<CompletionRecord>>;

    fn upsert(&self, prayer: PrayerName, completed: bool, day_key: IslamicDayKey) -> Result<()>;

    fn get(&self, prayer: PrayerName, day_key: IslamicDayKey) -> Result<Option<bool>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|r| r.prayer == prayer && r.day_key == day_key)
            .map(|r| r.completed))
    }
}

pub fn is_completed<S: CompletionStore + ?Sized>(
    store: &S,
    prayer: PrayerName,
    day_key: IslamicDayKey,
) -> Result<bool> {
    Ok(store.get(prayer, day_key)?.unwrap_or(false))
}

pub fn set_completed<S: CompletionStore + ?Sized>(
    store: &S,
    prayer: PrayerName,
    value: bool,
    day_key: IslamicDayKey,
) -> Result<()> {
    if prayer.is_boundary() {
        bail!("the closing Fajr belongs to the next day and cannot be marked");
    }
    store.upsert(prayer, value, day_key)
}

/// Flip the flag and return the new value.
pub fn toggle_completed<S: CompletionStore + ?Sized>(
    store: &S,
    prayer: PrayerName,
    day_key: IslamicDayKey,
) -> Result<bool> {
    let value = !is_completed(store, prayer, day_key)?;
    set_completed(store, prayer, value, day_key)?;
    Ok(value)
}

/// Prayers marked done for one day.
pub fn completed_for_day<S: CompletionStore + ?Sized>(
    store: &S,
    day_key: IslamicDayKey,
) -> Result<HashSet<PrayerName>> {
    Ok(store
        .list()?
        .into_iter()
        .filter(|r| r.day_key == day_key && r.completed)
        .map(|r| r.prayer)
        .collect())
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::cell::RefCell;

    /// Vec-backed store for tests.
    #[derive(Default)]
    pub struct MemoryStore {
        records: RefCell<Vec<CompletionRecord>>,
    }

    impl CompletionStore for MemoryStore {
        fn list(&self) -> Result<Vec<CompletionRecord>> {
            Ok(self.records.borrow().clone())
        }

        fn upsert(
            &self,
            prayer: PrayerName,
            completed: bool,
            day_key: IslamicDayKey,
        ) -> Result<()> {
            let mut records = self.records.borrow_mut();
            match records
                .iter_mut()
                .find(|r| r.prayer == prayer && r.day_key == day_key)
            {
                Some(r) => r.completed = completed,
                None => records.push(CompletionRecord {
                    prayer,
                    day_key,
                    completed,
                }),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use chrono::NaiveDate;

    fn key(d: u32) -> IslamicDayKey {
        IslamicDayKey::from_fajr_date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
    }

    #[test]
    fn set_then_read_on_the_same_key() {
        let store = MemoryStore::default();
        set_completed(&store, PrayerName::Isha, true, key(9)).unwrap();
        assert!(is_completed(&store, PrayerName::Isha, key(9)).unwrap());
        assert!(!is_completed(&store, PrayerName::Isha, key(10)).unwrap());
    }

    #[test]
    fn unknown_pair_reads_false() {
        let store = MemoryStore::default();
        assert!(!is_completed(&store, PrayerName::Fajr, key(1)).unwrap());
    }

    #[test]
    fn boundary_cannot_be_marked() {
        let store = MemoryStore::default();
        assert!(set_completed(&store, PrayerName::NextFajr, true, key(9)).is_err());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn toggle_flips_and_overwrites() {
        let store = MemoryStore::default();
        assert!(toggle_completed(&store, PrayerName::Asr, key(9)).unwrap());
        assert!(!toggle_completed(&store, PrayerName::Asr, key(9)).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn completed_for_day_ignores_other_days_and_cleared_flags() {
        let store = MemoryStore::default();
        set_completed(&store, PrayerName::Fajr, true, key(9)).unwrap();
        set_completed(&store, PrayerName::Dhuhr, false, key(9)).unwrap();
        set_completed(&store, PrayerName::Asr, true, key(10)).unwrap();
        let done = completed_for_day(&store, key(9)).unwrap();
        assert_eq!(done, HashSet::from([PrayerName::Fajr]));
    }
}

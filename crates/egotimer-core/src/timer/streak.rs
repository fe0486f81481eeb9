//! Daily meditation streak.
//!
//! A streak counts consecutive UTC days with at least one committed session.
//! It is stored as "days as of the last session day"; reading it on a later
//! day reports 0 once a whole day has been skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::KvStore;

const KEY_DAYS: &str = "streak.days";
const KEY_BEST: &str = "streak.best";
const KEY_LAST_DAY: &str = "streak.last_day";

/// What a completed session did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Already meditated today
    Unchanged,
    /// Yesterday continued into today
    Extended,
    /// First session ever, or the previous streak lapsed
    Started,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    days: u32,
    best: u32,
    last_day: Option<NaiveDate>,
}

impl StreakState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streak as seen on `today`.
    pub fn current(&self, today: NaiveDate) -> u32 {
        match self.last_day {
            Some(last) if last == today => self.days,
            Some(last) if last.succ_opt() == Some(today) => self.days,
            _ => 0,
        }
    }

    /// Longest streak ever reached.
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.last_day
    }

    /// Count a committed session on `today`.
    pub fn record_completion(&mut self, today: NaiveDate) -> StreakChange {
        let change = match self.last_day {
            // Includes a clock that went backwards
            Some(last) if today <= last => return StreakChange::Unchanged,
            Some(last) if last.succ_opt() == Some(today) => {
                self.days = self.days.saturating_add(1);
                StreakChange::Extended
            }
            _ => {
                self.days = 1;
                StreakChange::Started
            }
        };
        self.last_day = Some(today);
        self.best = self.best.max(self.days);
        change
    }

    pub fn load<S: KvStore>(store: &S) -> Result<Self, StoreError> {
        let last_day = store
            .get(KEY_LAST_DAY)?
            .and_then(|raw| match raw.parse::<NaiveDate>() {
                Ok(d) => Some(d),
                Err(e) => {
                    tracing::warn!(raw = %raw, error = %e, "bad streak date, streak restarts");
                    None
                }
            });
        let days = if last_day.is_some() {
            store.get_u64(KEY_DAYS)?.unwrap_or(0).min(u32::MAX as u64) as u32
        } else {
            0
        };
        let best = store.get_u64(KEY_BEST)?.unwrap_or(0).min(u32::MAX as u64) as u32;
        Ok(Self {
            days,
            best: best.max(days),
            last_day,
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_u64(KEY_DAYS, self.days as u64)?;
        store.put_u64(KEY_BEST, self.best as u64)?;
        match self.last_day {
            Some(day) => store.put(KEY_LAST_DAY, &day.to_string()),
            None => store.remove(KEY_LAST_DAY),
        }
    }
}

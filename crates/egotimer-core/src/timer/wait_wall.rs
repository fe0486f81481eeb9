//! Wait Wall - enforced cooldown between meditation sessions.
//!
//! Finishing a session stamps the wall. A new session may only start once
//! `duration_ms` has passed since that stamp, unless the wall is bypassed.
//!
//! ```text
//! active    = now - last_event < duration
//! remaining = max(0, duration - (now - last_event))
//! ```

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::KvStore;

const KEY_LAST_EVENT: &str = "wait_wall.last_event_ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitWall {
    /// When the last session finished (epoch milliseconds). 0 = never.
    pub last_event_ms: u64,
    pub duration_ms: u64,
}

impl WaitWall {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            last_event_ms: 0,
            duration_ms,
        }
    }

    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_event_ms) < self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.duration_ms
            .saturating_sub(now_ms.saturating_sub(self.last_event_ms))
    }

    /// Stamp the wall with a session completion.
    pub fn record(&mut self, now_ms: u64) {
        self.last_event_ms = now_ms;
    }

    /// Clear the wall immediately.
    pub fn bypass(&mut self) {
        self.last_event_ms = 0;
    }

    /// Load the stamp; the duration always comes from configuration.
    pub fn load<S: KvStore>(store: &S, duration_ms: u64) -> Result<Self, StoreError> {
        Ok(Self {
            last_event_ms: store.get_u64(KEY_LAST_EVENT)?.unwrap_or(0),
            duration_ms,
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_u64(KEY_LAST_EVENT, self.last_event_ms)
    }
}

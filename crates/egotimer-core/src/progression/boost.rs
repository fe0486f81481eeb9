//! Temporary earn-rate boosts.

use serde::{Deserialize, Serialize};

use crate::error::{Rejection, StoreError};
use crate::storage::KvStore;

const KEY_MULTIPLIER: &str = "boost.multiplier";
const KEY_EXPIRY: &str = "boost.expiry_ms";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostState {
    pub multiplier: f64,
    pub expiry_ms: u64,
}

impl Default for BoostState {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            expiry_ms: 0,
        }
    }
}

impl BoostState {
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms < self.expiry_ms
    }

    /// The multiplier in effect at `now_ms`; 1.0 once expired.
    pub fn multiplier_at(&self, now_ms: u64) -> f64 {
        if self.is_active(now_ms) {
            self.multiplier
        } else {
            1.0
        }
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expiry_ms.saturating_sub(now_ms)
    }

    /// Start a boost. Activating while one is running adds the duration on
    /// top of the remaining time and keeps the stronger multiplier.
    pub fn activate(
        &mut self,
        multiplier: f64,
        duration_ms: u64,
        now_ms: u64,
    ) -> Result<(), Rejection> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Rejection::InvalidBoost(format!(
                "multiplier {multiplier} must be at least 1"
            )));
        }
        if duration_ms == 0 {
            return Err(Rejection::InvalidBoost("duration must be positive".into()));
        }

        if self.is_active(now_ms) {
            self.expiry_ms = self.expiry_ms.saturating_add(duration_ms);
            self.multiplier = self.multiplier.max(multiplier);
        } else {
            self.expiry_ms = now_ms.saturating_add(duration_ms);
            self.multiplier = multiplier;
        }
        Ok(())
    }

    pub fn load<S: KvStore>(store: &S) -> Result<Self, StoreError> {
        let multiplier = store
            .get_f64(KEY_MULTIPLIER)?
            .filter(|m| *m >= 1.0)
            .unwrap_or(1.0);
        Ok(Self {
            multiplier,
            expiry_ms: store.get_u64(KEY_EXPIRY)?.unwrap_or(0),
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_f64(KEY_MULTIPLIER, self.multiplier)?;
        store.put_u64(KEY_EXPIRY, self.expiry_ms)
    }
}

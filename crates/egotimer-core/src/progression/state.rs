//! Spiritual ego counters.
//!
//! Earned ego lands in the `session` counter first. Only a committed session
//! moves it into the spendable `total` and the monotonic `lifetime` that
//! drives unlocks. Discarding a session throws the counter away.

use serde::{Deserialize, Serialize};

use crate::error::{Rejection, StoreError};
use crate::storage::KvStore;

const KEY_TOTAL: &str = "ego.total";
const KEY_LIFETIME: &str = "ego.lifetime";
const KEY_SESSION: &str = "ego.session";
const KEY_CARRY: &str = "ego.carry";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressionState {
    total: u64,
    lifetime: u64,
    session: u64,
    /// Fractional ego not yet paid out. Always in `[0, 1)`.
    carry: f64,
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spendable balance.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Everything ever committed. Never decreases.
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    /// Earned in the current session, not yet committed.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn carry(&self) -> f64 {
        self.carry
    }

    /// Integrate `rate` ego/second over `delta_seconds`.
    ///
    /// The fractional remainder is carried into the next call, so splitting
    /// a span into many small deltas pays out the same as one large delta.
    /// Returns the whole units added to the session counter.
    pub fn accumulate(&mut self, rate: f64, delta_seconds: f64) -> u64 {
        if !rate.is_finite() || !delta_seconds.is_finite() || rate <= 0.0 || delta_seconds <= 0.0
        {
            return 0;
        }
        self.credit(rate * delta_seconds)
    }

    /// Add `amount` ego, fractional part included, to the session counter.
    /// Returns the whole units added.
    pub fn credit(&mut self, amount: f64) -> u64 {
        if amount.is_nan() || amount <= 0.0 {
            return 0;
        }

        let produced = amount + self.carry;
        if !produced.is_finite() {
            self.carry = 0.0;
            self.session = u64::MAX;
            return u64::MAX;
        }

        let whole = produced.floor();
        let carry = produced - whole;
        self.carry = if (0.0..1.0).contains(&carry) { carry } else { 0.0 };

        // `as` saturates for values beyond u64::MAX
        let earned = whole as u64;
        self.session = self.session.saturating_add(earned);
        earned
    }

    /// Move the session counter into total and lifetime. Returns the amount
    /// committed.
    pub fn commit_session(&mut self) -> u64 {
        let earned = self.session;
        self.total = self.total.saturating_add(earned);
        self.lifetime = self.lifetime.saturating_add(earned);
        self.session = 0;
        self.carry = 0.0;
        earned
    }

    /// Drop the session counter without crediting it.
    pub fn discard_session(&mut self) -> u64 {
        let dropped = self.session;
        self.session = 0;
        self.carry = 0.0;
        dropped
    }

    /// Deduct from the spendable balance. Lifetime is untouched.
    pub fn spend(&mut self, cost: u64) -> Result<(), Rejection> {
        if self.total < cost {
            return Err(Rejection::InsufficientEgo {
                cost,
                balance: self.total,
            });
        }
        self.total -= cost;
        Ok(())
    }

    pub fn load<S: KvStore>(store: &S) -> Result<Self, StoreError> {
        let total = store.get_u64(KEY_TOTAL)?.unwrap_or(0);
        let lifetime = store.get_u64(KEY_LIFETIME)?.unwrap_or(0);
        let carry = store
            .get_f64(KEY_CARRY)?
            .filter(|c| (0.0..1.0).contains(c))
            .unwrap_or(0.0);
        if lifetime < total {
            tracing::warn!(total, lifetime, "lifetime below total in store, raising lifetime");
        }
        Ok(Self {
            total,
            lifetime: lifetime.max(total),
            session: store.get_u64(KEY_SESSION)?.unwrap_or(0),
            carry,
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_u64(KEY_TOTAL, self.total)?;
        store.put_u64(KEY_LIFETIME, self.lifetime)?;
        store.put_u64(KEY_SESSION, self.session)?;
        store.put_f64(KEY_CARRY, self.carry)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_balances(total: u64, lifetime: u64) -> Self {
        Self {
            total,
            lifetime: lifetime.max(total),
            session: 0,
            carry: 0.0,
        }
    }
}

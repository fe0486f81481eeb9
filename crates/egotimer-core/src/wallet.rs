//! Secondary currencies.
//!
//! Karma comes from quest rewards and pays for wait-wall bypasses. Stardust
//! is granted from outside (rewarded ads) and buys boosts and pet food.

use serde::{Deserialize, Serialize};

use crate::error::{Rejection, StoreError};
use crate::storage::KvStore;

const KEY_KARMA: &str = "wallet.karma";
const KEY_STARDUST: &str = "wallet.stardust";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Karma,
    Stardust,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Karma => "karma",
            Self::Stardust => "stardust",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub karma: u64,
    pub stardust: u64,
}

impl Wallet {
    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Karma => self.karma,
            Currency::Stardust => self.stardust,
        }
    }

    /// Credit `amount`, saturating. Returns the new balance.
    pub fn earn(&mut self, currency: Currency, amount: u64) -> u64 {
        let slot = self.slot(currency);
        *slot = slot.saturating_add(amount);
        *slot
    }

    /// Debit `amount`. Overspending is rejected and changes nothing.
    pub fn spend(&mut self, currency: Currency, amount: u64) -> Result<u64, Rejection> {
        let slot = self.slot(currency);
        if *slot < amount {
            return Err(Rejection::InsufficientFunds {
                currency: currency.as_str(),
                cost: amount,
                balance: *slot,
            });
        }
        *slot -= amount;
        Ok(*slot)
    }

    fn slot(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Karma => &mut self.karma,
            Currency::Stardust => &mut self.stardust,
        }
    }

    pub fn load<S: KvStore>(store: &S) -> Result<Self, StoreError> {
        Ok(Self {
            karma: store.get_u64(KEY_KARMA)?.unwrap_or(0),
            stardust: store.get_u64(KEY_STARDUST)?.unwrap_or(0),
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_u64(KEY_KARMA, self.karma)?;
        store.put_u64(KEY_STARDUST, self.stardust)
    }
}

//! Owned upgrade levels and purchasing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{find, UpgradeDefinition, CATALOG};
use crate::error::{Rejection, StoreError};
use crate::progression::ProgressionState;
use crate::storage::KvStore;

fn level_key(id: &str) -> String {
    format!("upgrade.{id}.level")
}

/// A successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub new_level: u32,
    pub cost: u64,
}

/// One row of the shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeStatus {
    #[serde(flatten)]
    pub definition: UpgradeDefinition,
    pub level: u32,
    /// `None` when maxed.
    pub next_cost: Option<u64>,
    pub affordable: bool,
    pub maxed: bool,
}

/// Level per upgrade id, plus the cached rate multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeState {
    levels: BTreeMap<String, u32>,
    multiplier: f64,
}

impl Default for UpgradeState {
    fn default() -> Self {
        Self {
            levels: BTreeMap::new(),
            multiplier: 1.0,
        }
    }
}

impl UpgradeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, id: &str) -> u32 {
        self.levels.get(id).copied().unwrap_or(0)
    }

    /// Price of the next level; `Ok(None)` once maxed.
    pub fn cost(&self, id: &str) -> Result<Option<u64>, Rejection> {
        let def = find(id).ok_or_else(|| Rejection::UnknownUpgrade(id.to_string()))?;
        Ok(def.cost_at(self.level(id)))
    }

    /// `1 + Σ effect_per_level × level`.
    pub fn total_multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Buy one level of `id` with spendable ego.
    ///
    /// On rejection neither the level nor the balance changes.
    pub fn purchase(
        &mut self,
        id: &str,
        progression: &mut ProgressionState,
    ) -> Result<Purchase, Rejection> {
        let def = find(id).ok_or_else(|| Rejection::UnknownUpgrade(id.to_string()))?;
        let level = self.level(id);
        let cost = def
            .cost_at(level)
            .ok_or_else(|| Rejection::UpgradeMaxed(id.to_string()))?;
        progression.spend(cost)?;

        let new_level = level + 1;
        self.levels.insert(def.id.to_string(), new_level);
        self.recompute();
        Ok(Purchase {
            id: def.id.to_string(),
            new_level,
            cost,
        })
    }

    pub fn statuses(&self, balance: u64) -> Vec<UpgradeStatus> {
        CATALOG
            .iter()
            .map(|def| {
                let level = self.level(def.id);
                let next_cost = def.cost_at(level);
                UpgradeStatus {
                    definition: *def,
                    level,
                    next_cost,
                    affordable: next_cost.is_some_and(|c| c <= balance),
                    maxed: next_cost.is_none(),
                }
            })
            .collect()
    }

    /// Levels bought across the whole catalog.
    pub fn total_levels(&self) -> u32 {
        self.levels.values().sum()
    }

    fn recompute(&mut self) {
        self.multiplier = 1.0
            + CATALOG
                .iter()
                .map(|def| def.multiplier_at(self.level(def.id)))
                .sum::<f64>();
    }

    pub fn load<S: KvStore>(store: &S) -> Result<Self, StoreError> {
        let mut state = Self::new();
        for def in &CATALOG {
            let raw = store.get_u64(&level_key(def.id))?.unwrap_or(0);
            let level = raw.min(def.max_level as u64) as u32;
            if raw > def.max_level as u64 {
                tracing::warn!(id = def.id, raw, "stored upgrade level above max, clamping");
            }
            if level > 0 {
                state.levels.insert(def.id.to_string(), level);
            }
        }
        state.recompute();
        Ok(state)
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        for def in &CATALOG {
            store.put_u64(&level_key(def.id), self.level(def.id) as u64)?;
        }
        Ok(())
    }
}

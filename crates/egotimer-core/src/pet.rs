//! The virtual pet.
//!
//! Mood lives in `0..=100` and drains linearly with wall time. Feeding
//! (stardust) and committed sessions top it up. Decay is applied lazily:
//! every read or write first settles the mood up to `now`.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::KvStore;

const KEY_MOOD: &str = "pet.mood";
const KEY_LAST_UPDATE: &str = "pet.last_update_ms";

pub const MAX_MOOD: f64 = 100.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Ecstatic,
    Content,
    Sulking,
    Depressed,
}

impl Mood {
    pub fn from_level(level: f64) -> Self {
        if level >= 80.0 {
            Self::Ecstatic
        } else if level >= 50.0 {
            Self::Content
        } else if level >= 20.0 {
            Self::Sulking
        } else {
            Self::Depressed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PetState {
    mood: f64,
    last_update_ms: u64,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            mood: MAX_MOOD,
            last_update_ms: 0,
        }
    }
}

impl PetState {
    /// A happy pet adopted at `now_ms`.
    pub fn adopted(now_ms: u64) -> Self {
        Self {
            mood: MAX_MOOD,
            last_update_ms: now_ms,
        }
    }

    /// Mood at `now_ms` without mutating.
    pub fn mood_at(&self, now_ms: u64, decay_per_hour: f64) -> f64 {
        let hours = now_ms.saturating_sub(self.last_update_ms) as f64 / MS_PER_HOUR;
        let decay = if decay_per_hour.is_finite() && decay_per_hour > 0.0 {
            decay_per_hour * hours
        } else {
            0.0
        };
        clamp_mood(self.mood - decay)
    }

    pub fn label_at(&self, now_ms: u64, decay_per_hour: f64) -> Mood {
        Mood::from_level(self.mood_at(now_ms, decay_per_hour))
    }

    /// Fold decay up to `now_ms` into the stored mood.
    pub fn settle(&mut self, now_ms: u64, decay_per_hour: f64) {
        self.mood = self.mood_at(now_ms, decay_per_hour);
        self.last_update_ms = self.last_update_ms.max(now_ms);
    }

    /// Settle, then add `amount`. Returns the new mood.
    pub fn cheer(&mut self, amount: f64, now_ms: u64, decay_per_hour: f64) -> f64 {
        self.settle(now_ms, decay_per_hour);
        if amount.is_finite() && amount > 0.0 {
            self.mood = clamp_mood(self.mood + amount);
        }
        self.mood
    }

    pub fn load<S: KvStore>(store: &S, now_ms: u64) -> Result<Self, StoreError> {
        let Some(last_update_ms) = store.get_u64(KEY_LAST_UPDATE)? else {
            return Ok(Self::adopted(now_ms));
        };
        let mood = store.get_f64(KEY_MOOD)?.map(clamp_mood).unwrap_or(MAX_MOOD);
        Ok(Self {
            mood,
            last_update_ms,
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_f64(KEY_MOOD, self.mood)?;
        store.put_u64(KEY_LAST_UPDATE, self.last_update_ms)
    }
}

fn clamp_mood(mood: f64) -> f64 {
    if mood.is_nan() {
        return 0.0;
    }
    mood.clamp(0.0, MAX_MOOD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const NOW: u64 = 1_717_977_600_000;
    const HOUR: u64 = 3_600_000;

    #[test]
    fn mood_decays_linearly() {
        let pet = PetState::adopted(NOW);
        assert_eq!(pet.mood_at(NOW, 4.0), 100.0);
        assert!((pet.mood_at(NOW + 5 * HOUR, 4.0) - 80.0).abs() < 1e-9);
        assert_eq!(pet.label_at(NOW + 5 * HOUR, 4.0), Mood::Ecstatic);
        assert_eq!(pet.label_at(NOW + 6 * HOUR, 4.0), Mood::Content);
    }

    #[test]
    fn mood_clamps_at_zero() {
        let pet = PetState::adopted(NOW);
        assert_eq!(pet.mood_at(NOW + 1_000 * HOUR, 4.0), 0.0);
        assert_eq!(pet.label_at(NOW + 1_000 * HOUR, 4.0), Mood::Depressed);
    }

    #[test]
    fn feeding_settles_then_adds() {
        let mut pet = PetState::adopted(NOW);
        // 20 hours at 4/h leaves 20
        let mood = pet.cheer(25.0, NOW + 20 * HOUR, 4.0);
        assert!((mood - 45.0).abs() < 1e-9);
        assert_eq!(pet.label_at(NOW + 20 * HOUR, 4.0), Mood::Sulking);
    }

    #[test]
    fn mood_clamps_at_max() {
        let mut pet = PetState::adopted(NOW);
        assert_eq!(pet.cheer(50.0, NOW, 4.0), MAX_MOOD);
    }

    #[test]
    fn clock_going_backwards_does_not_heal() {
        let mut pet = PetState::adopted(NOW);
        pet.settle(NOW + 10 * HOUR, 4.0);
        pet.settle(NOW, 4.0);
        assert!((pet.mood_at(NOW + 10 * HOUR, 4.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn labels_cover_boundaries() {
        assert_eq!(Mood::from_level(80.0), Mood::Ecstatic);
        assert_eq!(Mood::from_level(79.9), Mood::Content);
        assert_eq!(Mood::from_level(50.0), Mood::Content);
        assert_eq!(Mood::from_level(20.0), Mood::Sulking);
        assert_eq!(Mood::from_level(19.9), Mood::Depressed);
    }

    #[test]
    fn fresh_store_adopts_happy_pet() {
        let store = MemoryStore::new();
        let pet = PetState::load(&store, NOW).unwrap();
        assert_eq!(pet, PetState::adopted(NOW));
    }

    #[test]
    fn persists_through_store() {
        let mut store = MemoryStore::new();
        let mut pet = PetState::adopted(NOW);
        pet.settle(NOW + 3 * HOUR, 4.0);
        pet.save(&mut store).unwrap();
        assert_eq!(PetState::load(&store, NOW + 9 * HOUR).unwrap(), pet);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_mood_stays_in_range(
            steps in proptest::collection::vec((0u64..50_000_000, 0.0f64..60.0), 1..30),
            decay in 0.0f64..50.0,
        ) {
            let mut now = 1_717_977_600_000u64;
            let mut pet = PetState::adopted(now);
            for (advance, feed) in steps {
                now += advance;
                let mood = pet.cheer(feed, now, decay);
                prop_assert!((0.0..=MAX_MOOD).contains(&mood));
            }
        }
    }
}

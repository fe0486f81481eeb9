//! Truth Punch unlock ladder.
//!
//! 100 ranked truths. Rank 100 is free, rank 1 is the hardest. Each rank
//! unlocks once lifetime ego reaches its threshold, and the ladder only ever
//! moves toward rank 1: `highest_unlocked_rank` is the numerically lowest
//! rank reached so far, and every rank from it up to 100 is unlocked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Rejection, StoreError};
use crate::storage::KvStore;

pub const RANK_COUNT: u8 = 100;

const KEY_HIGHEST: &str = "unlock.highest_rank";
const KEY_SEEN: &str = "unlock.seen";

/// Threshold per rank, indexed by `rank - 1`.
///
/// Rank 100 costs nothing, rank 99 costs 100 and every harder rank costs
/// 1.1911× the previous one, rounded down. Rank 1 lands near 2.68 billion.
pub const UNLOCK_THRESHOLDS: [u64; RANK_COUNT as usize] = build_thresholds();

const fn build_thresholds() -> [u64; RANK_COUNT as usize] {
    let mut table = [0u64; RANK_COUNT as usize];
    table[98] = 100;
    let mut i = 97;
    loop {
        table[i] = table[i + 1] * 11_911 / 10_000;
        if i == 0 {
            break;
        }
        i -= 1;
    }
    table
}

/// Lifetime ego needed for `rank`; `None` outside 1..=100.
pub fn threshold(rank: u8) -> Option<u64> {
    if rank == 0 || rank > RANK_COUNT {
        return None;
    }
    Some(UNLOCK_THRESHOLDS[rank as usize - 1])
}

/// One truth as shown in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthPunch {
    pub rank: u8,
    pub threshold: u64,
    pub unlocked: bool,
    pub seen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockState {
    highest_unlocked_rank: u8,
    seen: BTreeSet<u8>,
}

impl Default for UnlockState {
    fn default() -> Self {
        Self {
            highest_unlocked_rank: RANK_COUNT,
            seen: BTreeSet::new(),
        }
    }
}

impl UnlockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highest_unlocked_rank(&self) -> u8 {
        self.highest_unlocked_rank
    }

    pub fn is_unlocked(&self, rank: u8) -> bool {
        rank >= self.highest_unlocked_rank && rank <= RANK_COUNT
    }

    /// Unlock every rank `lifetime` now pays for. Returns the newly unlocked
    /// ranks, easiest (numerically highest) first.
    pub fn check_unlocks(&mut self, lifetime: u64) -> Vec<u8> {
        let mut newly = Vec::new();
        let mut rank = self.highest_unlocked_rank;
        while rank > 1 {
            let next = rank - 1;
            match threshold(next) {
                Some(t) if t <= lifetime => {
                    newly.push(next);
                    rank = next;
                }
                _ => break,
            }
        }
        self.highest_unlocked_rank = rank;
        newly
    }

    /// Record that a truth was read. Returns whether it was new.
    pub fn mark_seen(&mut self, rank: u8) -> Result<bool, Rejection> {
        if !self.is_unlocked(rank) {
            return Err(Rejection::TruthLocked(rank));
        }
        Ok(self.seen.insert(rank))
    }

    pub fn is_seen(&self, rank: u8) -> bool {
        self.seen.contains(&rank)
    }

    /// Unlocked truths not read yet, for the badge.
    pub fn unseen_count(&self) -> usize {
        (self.highest_unlocked_rank..=RANK_COUNT)
            .filter(|r| !self.seen.contains(r))
            .count()
    }

    /// The next rank to unlock and its threshold; `None` once rank 1 is in.
    pub fn next_threshold(&self) -> Option<(u8, u64)> {
        let next = self.highest_unlocked_rank.checked_sub(1)?;
        threshold(next).map(|t| (next, t))
    }

    /// Unlocked ranks, rank 100 first.
    pub fn unlocked_ranks(&self) -> Vec<u8> {
        (self.highest_unlocked_rank..=RANK_COUNT).rev().collect()
    }

    /// Every truth, rank 100 first.
    pub fn truths(&self) -> Vec<TruthPunch> {
        (1..=RANK_COUNT)
            .rev()
            .map(|rank| TruthPunch {
                rank,
                threshold: UNLOCK_THRESHOLDS[rank as usize - 1],
                unlocked: self.is_unlocked(rank),
                seen: self.is_seen(rank),
            })
            .collect()
    }

    pub fn load<S: KvStore>(store: &S) -> Result<Self, StoreError> {
        let highest = match store.get_u64(KEY_HIGHEST)? {
            Some(r) if (1..=RANK_COUNT as u64).contains(&r) => r as u8,
            Some(r) => {
                tracing::warn!(rank = r, "stored unlock rank out of range, resetting");
                RANK_COUNT
            }
            None => RANK_COUNT,
        };
        let seen: BTreeSet<u8> = store
            .get_json::<Vec<u8>>(KEY_SEEN)?
            .unwrap_or_default()
            .into_iter()
            .filter(|r| *r >= highest && *r <= RANK_COUNT)
            .collect();
        Ok(Self {
            highest_unlocked_rank: highest,
            seen,
        })
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_u64(KEY_HIGHEST, self.highest_unlocked_rank as u64)?;
        let seen: Vec<u8> = self.seen.iter().copied().collect();
        store.put_json(KEY_SEEN, &seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn threshold_table_shape() {
        assert_eq!(threshold(100), Some(0));
        assert_eq!(threshold(99), Some(100));
        assert_eq!(threshold(98), Some(119));
        assert_eq!(threshold(1), Some(2_684_588_330));
        assert_eq!(threshold(0), None);
        assert_eq!(threshold(101), None);
    }

    #[test]
    fn thresholds_grow_as_rank_drops() {
        assert!(UNLOCK_THRESHOLDS.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn reference_unlock() {
        let mut state = UnlockState::new();
        assert_eq!(state.check_unlocks(100), vec![99]);
        assert_eq!(state.highest_unlocked_rank(), 99);
    }

    #[test]
    fn nothing_new_below_next_threshold() {
        let mut state = UnlockState::new();
        assert!(state.check_unlocks(99).is_empty());
        assert_eq!(state.highest_unlocked_rank(), 100);
    }

    #[test]
    fn several_unlocks_come_easiest_first() {
        let mut state = UnlockState::new();
        // 100, 119 and 141 are covered, 167 is not
        let newly = state.check_unlocks(150);
        assert_eq!(newly, vec![99, 98, 97]);
        assert_eq!(state.highest_unlocked_rank(), 97);
        assert!(state.check_unlocks(150).is_empty());
    }

    #[test]
    fn everything_unlocks_at_the_top() {
        let mut state = UnlockState::new();
        let newly = state.check_unlocks(u64::MAX);
        assert_eq!(newly.len(), 99);
        assert_eq!(newly.first(), Some(&99));
        assert_eq!(newly.last(), Some(&1));
        assert_eq!(state.next_threshold(), None);
    }

    #[test]
    fn lower_lifetime_never_relocks() {
        let mut state = UnlockState::new();
        state.check_unlocks(10_000);
        let reached = state.highest_unlocked_rank();
        assert!(state.check_unlocks(0).is_empty());
        assert_eq!(state.highest_unlocked_rank(), reached);
    }

    #[test]
    fn seen_tracking_and_badge() {
        let mut state = UnlockState::new();
        assert_eq!(state.unseen_count(), 1);
        state.check_unlocks(120);
        assert_eq!(state.unseen_count(), 3);
        assert_eq!(state.mark_seen(99), Ok(true));
        assert_eq!(state.mark_seen(99), Ok(false));
        assert_eq!(state.unseen_count(), 2);
        assert_eq!(state.mark_seen(50), Err(Rejection::TruthLocked(50)));
        assert_eq!(state.mark_seen(0), Err(Rejection::TruthLocked(0)));
    }

    #[test]
    fn next_threshold_names_the_gap() {
        let state = UnlockState::new();
        assert_eq!(state.next_threshold(), Some((99, 100)));
        assert_eq!(state.unlocked_ranks(), vec![100]);
    }

    #[test]
    fn truths_list_marks_state() {
        let mut state = UnlockState::new();
        state.check_unlocks(100);
        state.mark_seen(100).unwrap();
        let truths = state.truths();
        assert_eq!(truths.len(), 100);
        assert_eq!(truths[0].rank, 100);
        assert!(truths[0].seen);
        assert!(truths[1].unlocked && !truths[1].seen);
        assert!(!truths[2].unlocked);
    }

    #[test]
    fn persists_through_store() {
        let mut store = MemoryStore::new();
        let mut state = UnlockState::new();
        state.check_unlocks(5_000);
        state.mark_seen(98).unwrap();
        state.save(&mut store).unwrap();
        assert_eq!(UnlockState::load(&store).unwrap(), state);
    }

    #[test]
    fn malformed_data_falls_back() {
        let mut store = MemoryStore::new();
        store.put("unlock.highest_rank", "250").unwrap();
        store.put("unlock.seen", "not json").unwrap();
        assert_eq!(UnlockState::load(&store).unwrap(), UnlockState::new());
    }
}

//! Truth Punches unlocked by lifetime ego.
mod ladder;

pub use ladder::{threshold, TruthPunch, UnlockState, RANK_COUNT, UNLOCK_THRESHOLDS};

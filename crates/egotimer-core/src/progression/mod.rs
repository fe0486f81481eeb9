//! Spiritual ego accumulation.
//!
//! - [`ProgressionState`]: session/total/lifetime counters with fractional carry
//! - [`RateModel`]: the per-second earn rate
//! - [`BoostState`]: time-limited rate multipliers

mod boost;
mod rate;
mod state;

pub use boost::BoostState;
pub use rate::{
    session_bonus, session_bonus_integral, streak_multiplier, RateBreakdown, RateModel, MAX_SESSION_BONUS,
    SESSION_BONUS_PER_MINUTE, STREAK_MULTIPLIERS,
};
pub use state::ProgressionState;

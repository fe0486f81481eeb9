//! Earn-rate model.
//!
//! ```text
//! rate = base × streak(days) × upgrades × session_bonus(minutes) × boost
//! ```

use serde::{Deserialize, Serialize};

/// Streak multiplier steps, sorted by day threshold.
///
/// The multiplier for a streak is the value of the largest threshold that
/// does not exceed it.
pub const STREAK_MULTIPLIERS: [(u32, f64); 6] = [
    (0, 1.0),
    (3, 1.25),
    (7, 1.5),
    (14, 2.0),
    (30, 3.0),
    (60, 4.0),
];

pub const SESSION_BONUS_PER_MINUTE: f64 = 0.02;
pub const MAX_SESSION_BONUS: f64 = 10.0;

/// Session minute at which the bonus stops growing.
const BONUS_CAP_MINUTES: f64 = (MAX_SESSION_BONUS - 1.0) / SESSION_BONUS_PER_MINUTE;

pub fn streak_multiplier(streak_days: u32) -> f64 {
    let idx = STREAK_MULTIPLIERS.partition_point(|&(threshold, _)| threshold <= streak_days);
    // Threshold 0 always matches, so idx >= 1
    STREAK_MULTIPLIERS[idx.saturating_sub(1)].1
}

/// `min(1 + 0.02 × minutes, 10)`. Negative or NaN minutes count as zero.
pub fn session_bonus(elapsed_minutes: f64) -> f64 {
    (1.0 + SESSION_BONUS_PER_MINUTE * clean_minutes(elapsed_minutes)).min(MAX_SESSION_BONUS)
}

/// [`session_bonus`] integrated over the first `minutes` of a session.
///
/// Linear growth up to the cap, flat after it. Paying out the difference of
/// two integrals makes earnings independent of how often the session ticks.
pub fn session_bonus_integral(minutes: f64) -> f64 {
    let minutes = clean_minutes(minutes);
    let growing = minutes.min(BONUS_CAP_MINUTES);
    let capped = (minutes - BONUS_CAP_MINUTES).max(0.0);
    growing
        + SESSION_BONUS_PER_MINUTE / 2.0 * growing * growing
        + MAX_SESSION_BONUS * capped
}

fn clean_minutes(minutes: f64) -> f64 {
    if minutes.is_nan() {
        0.0
    } else {
        minutes.max(0.0)
    }
}

/// Every factor of the current rate, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBreakdown {
    pub base: f64,
    pub streak: f64,
    pub upgrades: f64,
    pub session: f64,
    pub boost: f64,
    pub per_second: f64,
}

/// The factors that come from persisted state rather than from the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateModel {
    pub base_rate: f64,
    pub upgrade_multiplier: f64,
    pub boost_multiplier: f64,
}

impl Default for RateModel {
    fn default() -> Self {
        Self {
            base_rate: 1.0,
            upgrade_multiplier: 1.0,
            boost_multiplier: 1.0,
        }
    }
}

impl RateModel {
    /// Ego per second.
    pub fn rate(&self, streak_days: u32, elapsed_minutes: f64) -> f64 {
        self.breakdown(streak_days, elapsed_minutes).per_second
    }

    /// Ego earned while the session clock runs from `from_minutes` to
    /// `to_minutes`, with every factor except the session bonus held fixed.
    pub fn earned_between(&self, streak_days: u32, from_minutes: f64, to_minutes: f64) -> f64 {
        let fixed = self.breakdown(streak_days, 0.0);
        let bonus_minutes =
            (session_bonus_integral(to_minutes) - session_bonus_integral(from_minutes)).max(0.0);
        fixed.base * fixed.streak * fixed.upgrades * fixed.boost * bonus_minutes * 60.0
    }

    pub fn breakdown(&self, streak_days: u32, elapsed_minutes: f64) -> RateBreakdown {
        let streak = streak_multiplier(streak_days);
        let session = session_bonus(elapsed_minutes);
        let base = sanitize(self.base_rate, 0.0);
        let upgrades = sanitize(self.upgrade_multiplier, 1.0);
        let boost = sanitize(self.boost_multiplier, 1.0);
        RateBreakdown {
            base,
            streak,
            upgrades,
            session,
            boost,
            per_second: base * streak * upgrades * session * boost,
        }
    }
}

fn sanitize(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v >= 0.0 {
        v
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_table_is_sorted() {
        assert!(STREAK_MULTIPLIERS.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(STREAK_MULTIPLIERS.windows(2).all(|w| w[0].1 < w[1].1));
        assert_eq!(STREAK_MULTIPLIERS[0].0, 0);
    }

    #[test]
    fn streak_multiplier_steps() {
        assert_eq!(streak_multiplier(0), 1.0);
        assert_eq!(streak_multiplier(2), 1.0);
        assert_eq!(streak_multiplier(3), 1.25);
        assert_eq!(streak_multiplier(7), 1.5);
        assert_eq!(streak_multiplier(13), 1.5);
        assert_eq!(streak_multiplier(29), 2.0);
        assert_eq!(streak_multiplier(60), 4.0);
        assert_eq!(streak_multiplier(u32::MAX), 4.0);
    }

    #[test]
    fn session_bonus_caps_at_ten() {
        assert_eq!(session_bonus(0.0), 1.0);
        assert_eq!(session_bonus(50.0), 2.0);
        assert_eq!(session_bonus(450.0), 10.0);
        assert_eq!(session_bonus(10_000.0), 10.0);
        assert_eq!(session_bonus(-3.0), 1.0);
        assert_eq!(session_bonus(f64::NAN), 1.0);
    }

    #[test]
    fn reference_rate() {
        let model = RateModel::default();
        assert_eq!(model.rate(7, 50.0), 3.0);
    }

    #[test]
    fn bonus_integral_is_linear_then_flat() {
        assert_eq!(session_bonus_integral(0.0), 0.0);
        assert!((session_bonus_integral(50.0) - 75.0).abs() < 1e-9);
        assert!((session_bonus_integral(450.0) - 2475.0).abs() < 1e-6);
        assert!((session_bonus_integral(460.0) - 2575.0).abs() < 1e-6);
        assert_eq!(session_bonus_integral(-1.0), 0.0);
    }

    #[test]
    fn earned_between_splits_cleanly() {
        let model = RateModel::default();
        // Average bonus over the first 50 minutes is 1.5
        let whole = model.earned_between(7, 0.0, 50.0);
        assert!((whole - 1.5 * 1.5 * 3000.0).abs() < 1e-6);
        let parts: f64 = (0..50)
            .map(|m| model.earned_between(7, m as f64, (m + 1) as f64))
            .sum();
        assert!((whole - parts).abs() < 1e-6);
        assert_eq!(model.earned_between(0, 10.0, 5.0), 0.0);
    }

    #[test]
    fn breakdown_multiplies_every_factor() {
        let model = RateModel {
            base_rate: 2.0,
            upgrade_multiplier: 1.5,
            boost_multiplier: 2.0,
        };
        let b = model.breakdown(14, 0.0);
        assert_eq!(b.streak, 2.0);
        assert_eq!(b.session, 1.0);
        assert_eq!(b.per_second, 12.0);
    }

    #[test]
    fn garbage_factors_fall_back() {
        let model = RateModel {
            base_rate: f64::NAN,
            upgrade_multiplier: -4.0,
            boost_multiplier: f64::INFINITY,
        };
        assert_eq!(model.rate(0, 0.0), 0.0);
    }
}

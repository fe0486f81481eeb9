//! Events returned by engine operations, serialized with a `type` tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quests::QuestProgress;
use crate::timer::StreakChange;

/// Every state change the engine makes produces an Event.
/// Front ends render them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        target_ms: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Running time was turned into ego.
    EgoAccumulated {
        elapsed_ms: u64,
        earned: u64,
        session_total: u64,
        /// Average over the span, boost split included.
        rate_per_second: f64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. The session still needs finishing.
    SessionCompleted {
        at: DateTime<Utc>,
    },
    SessionCommitted {
        earned: u64,
        meditated_ms: u64,
        total: u64,
        lifetime: u64,
        at: DateTime<Utc>,
    },
    SessionDiscarded {
        forfeited: u64,
        at: DateTime<Utc>,
    },
    StreakChanged {
        change: StreakChange,
        days: u32,
        at: DateTime<Utc>,
    },
    UpgradePurchased {
        id: String,
        new_level: u32,
        cost: u64,
        multiplier: f64,
        at: DateTime<Utc>,
    },
    TruthUnlocked {
        rank: u8,
        at: DateTime<Utc>,
    },
    TruthSeen {
        rank: u8,
        at: DateTime<Utc>,
    },
    WaitWallBypassed {
        karma_spent: u64,
        at: DateTime<Utc>,
    },
    BoostActivated {
        multiplier: f64,
        expires_at: DateTime<Utc>,
        stardust_spent: u64,
        at: DateTime<Utc>,
    },
    StardustGranted {
        amount: u64,
        balance: u64,
        at: DateTime<Utc>,
    },
    PetFed {
        mood: f64,
        stardust_spent: u64,
        at: DateTime<Utc>,
    },
    QuestProgressed {
        #[serde(flatten)]
        progress: QuestProgress,
        at: DateTime<Utc>,
    },
    QuestClaimed {
        id: String,
        karma: u64,
        at: DateTime<Utc>,
    },
}

//! # egotimer core library
//!
//! The progression engine behind the egotimer meditation timer. Meditating
//! earns "spiritual ego", ego buys upgrades that raise the earn rate, and
//! lifetime ego unlocks 100 ranked Truth Punches. Around that sit a daily
//! streak, a cooldown wait wall, temporary boosts, a virtual pet, daily
//! quests and two side currencies.
//!
//! The standalone CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Engine**: [`EgoEngine`] loads every piece of state from a
//!   [`KvStore`], runs one operation at a time against a [`Clock`], persists
//!   and returns [`Event`]s
//! - **State modules**: plain structs with `load`/`save` against the store
//!   ([`ProgressionState`], [`UpgradeState`], [`UnlockState`], ...)
//! - **Storage**: SQLite key-value and session history ([`Database`]),
//!   in-memory store for tests, TOML configuration ([`Config`])
//!
//! ## Example
//!
//! ```
//! use egotimer_core::{Config, EgoEngine, ManualClock, MemoryStore};
//!
//! let clock = ManualClock::new(1_717_977_600_000);
//! let mut engine = EgoEngine::load(MemoryStore::new(), &clock, Config::default())?;
//! engine.start_session(Some(10))?;
//! clock.advance_secs(10);
//! engine.tick()?;
//! assert_eq!(engine.progression().session(), 10);
//! # Ok::<(), egotimer_core::CoreError>(())
//! ```

pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod pet;
pub mod progression;
pub mod quests;
pub mod storage;
pub mod timer;
pub mod unlocks;
pub mod upgrades;
pub mod wallet;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{CompletedSession, EgoEngine, Snapshot};
pub use error::{ConfigError, CoreError, Rejection, StoreError};
pub use events::Event;
pub use format::{format_ego, format_grouped};
pub use pet::{Mood, PetState};
pub use progression::{BoostState, ProgressionState, RateBreakdown, RateModel};
pub use quests::{Quest, QuestBoard, QuestKind};
pub use storage::{Config, Database, KvStore, MemoryStore, Stats};
pub use timer::{MeditationSession, SessionState, StreakState, WaitWall};
pub use unlocks::{TruthPunch, UnlockState};
pub use upgrades::{UpgradeDefinition, UpgradeState, UpgradeStatus, CATALOG};
pub use wallet::{Currency, Wallet};

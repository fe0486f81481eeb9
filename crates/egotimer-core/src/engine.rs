//! The progression engine.
//!
//! [`EgoEngine`] owns a [`KvStore`], a [`Clock`], the configuration and every
//! piece of loaded game state. Each operation reads the clock once, mutates
//! in memory, persists the whole state and returns the [`Event`]s it caused.
//! A rejected operation returns before anything is mutated or written.
//!
//! Running session time is flushed into ego before anything that changes
//! the earn rate (buying an upgrade, activating a boost), so time already
//! meditated is always paid at the rate that was in effect.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::{day_of, to_datetime, Clock};
use crate::error::{Rejection, Result};
use crate::events::Event;
use crate::format::{format_ego, format_grouped};
use crate::pet::{Mood, PetState};
use crate::progression::{BoostState, ProgressionState, RateBreakdown, RateModel};
use crate::quests::{QuestBoard, QuestKind};
use crate::storage::{Config, Database, KvStore};
use crate::timer::{MeditationSession, SessionState, StreakChange, StreakState, WaitWall};
use crate::unlocks::UnlockState;
use crate::upgrades::{UpgradeState, UpgradeStatus};
use crate::wallet::{Currency, Wallet};

const KEY_SESSION: &str = "session.timer";

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub at: DateTime<Utc>,
    pub ego: EgoView,
    pub rate: RateBreakdown,
    pub session: SessionView,
    pub streak: StreakView,
    pub wait_wall: WaitWallView,
    pub boost: BoostView,
    pub upgrades: UpgradesView,
    pub wallet: Wallet,
    pub pet: PetView,
    pub truths: TruthsView,
    pub quests: QuestBoard,
    pub claimable_quests: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EgoView {
    pub total: u64,
    pub lifetime: u64,
    pub session: u64,
    pub display: String,
    /// Total with thousands separators.
    pub grouped: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub target_ms: u64,
    pub remaining_ms: u64,
    pub elapsed_ms: u64,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreakView {
    pub days: u32,
    pub best: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitWallView {
    pub active: bool,
    pub remaining_ms: u64,
    pub bypass_karma_cost: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoostView {
    pub active: bool,
    pub multiplier: f64,
    pub remaining_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradesView {
    pub levels_bought: u32,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PetView {
    pub mood: f64,
    pub label: Mood,
}

#[derive(Debug, Clone, Serialize)]
pub struct TruthsView {
    pub highest_unlocked_rank: u8,
    pub unseen: usize,
    pub next_rank: Option<u8>,
    pub next_threshold: Option<u64>,
}

/// What a finished session amounted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedSession {
    pub earned: u64,
    pub meditated_ms: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

pub struct EgoEngine<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    config: Config,
    progression: ProgressionState,
    boost: BoostState,
    upgrades: UpgradeState,
    unlocks: UnlockState,
    wall: WaitWall,
    streak: StreakState,
    wallet: Wallet,
    pet: PetState,
    quests: QuestBoard,
    session: MeditationSession,
}

impl<S: KvStore, C: Clock> EgoEngine<S, C> {
    /// Load all state from `store`. Missing or malformed entries fall back
    /// to their defaults.
    pub fn load(store: S, clock: C, config: Config) -> Result<Self> {
        let now = clock.now_ms();
        let session: MeditationSession = store.get_json(KEY_SESSION)?.unwrap_or_default();
        let engine = Self {
            progression: ProgressionState::load(&store)?,
            boost: BoostState::load(&store)?,
            upgrades: UpgradeState::load(&store)?,
            unlocks: UnlockState::load(&store)?,
            wall: WaitWall::load(&store, config.wait_wall_ms())?,
            streak: StreakState::load(&store)?,
            wallet: Wallet::load(&store)?,
            pet: PetState::load(&store, now)?,
            quests: QuestBoard::load(&store, day_of(now))?,
            session,
            store,
            clock,
            config,
        };
        tracing::debug!(
            total = engine.progression.total(),
            lifetime = engine.progression.lifetime(),
            "engine loaded"
        );
        Ok(engine)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn upgrades(&self) -> &UpgradeState {
        &self.upgrades
    }

    pub fn unlocks(&self) -> &UnlockState {
        &self.unlocks
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn session(&self) -> &MeditationSession {
        &self.session
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn boost(&self) -> &BoostState {
        &self.boost
    }

    pub fn wait_wall(&self) -> &WaitWall {
        &self.wall
    }

    pub fn pet(&self) -> &PetState {
        &self.pet
    }

    /// Today's quest board, fresh if the stored one is from another day.
    pub fn quests(&self) -> QuestBoard {
        let today = day_of(self.clock.now_ms());
        if self.quests.day == today {
            self.quests.clone()
        } else {
            QuestBoard::generate(today)
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The earn rate right now, factor by factor.
    pub fn rate(&self) -> RateBreakdown {
        let now = self.clock.now_ms();
        self.rate_model(self.boost.multiplier_at(now))
            .breakdown(self.streak.current(day_of(now)), self.session.elapsed_minutes())
    }

    pub fn upgrade_statuses(&self) -> Vec<UpgradeStatus> {
        self.upgrades.statuses(self.progression.total())
    }

    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now_ms();
        let today = day_of(now);
        let decay = self.config.pet.decay_per_hour;
        let mood = self.pet.mood_at(now, decay);
        let next = self.unlocks.next_threshold();
        let quests = self.quests();
        let claimable_quests = quests.claimable();
        Snapshot {
            at: to_datetime(now),
            ego: EgoView {
                total: self.progression.total(),
                lifetime: self.progression.lifetime(),
                session: self.progression.session(),
                display: format_ego(self.progression.total()),
                grouped: format_grouped(self.progression.total()),
            },
            rate: self.rate(),
            session: SessionView {
                state: self.session.state(),
                target_ms: self.session.target_ms(),
                remaining_ms: self.session.remaining_ms(),
                elapsed_ms: self.session.elapsed_ms(),
                progress: self.session.progress(),
            },
            streak: StreakView {
                days: self.streak.current(today),
                best: self.streak.best(),
            },
            wait_wall: WaitWallView {
                active: self.wall.is_active(now),
                remaining_ms: self.wall.remaining_ms(now),
                bypass_karma_cost: self.config.wait_wall.bypass_karma_cost,
            },
            boost: BoostView {
                active: self.boost.is_active(now),
                multiplier: self.boost.multiplier_at(now),
                remaining_ms: self.boost.remaining_ms(now),
            },
            upgrades: UpgradesView {
                levels_bought: self.upgrades.total_levels(),
                multiplier: self.upgrades.total_multiplier(),
            },
            wallet: self.wallet,
            pet: PetView {
                mood,
                label: self.pet.label_at(now, decay),
            },
            truths: TruthsView {
                highest_unlocked_rank: self.unlocks.highest_unlocked_rank(),
                unseen: self.unlocks.unseen_count(),
                next_rank: next.map(|(rank, _)| rank),
                next_threshold: next.map(|(_, t)| t),
            },
            quests,
            claimable_quests,
        }
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Start a session of `minutes`, or the configured default.
    pub fn start_session(&mut self, minutes: Option<u64>) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        if self.session.in_progress() {
            return Err(rejected("start_session", Rejection::SessionInProgress));
        }
        if self.wall.is_active(now) {
            let remaining_ms = self.wall.remaining_ms(now);
            return Err(rejected(
                "start_session",
                Rejection::WaitWallActive { remaining_ms },
            ));
        }

        let target_ms = minutes
            .map(|m| m.saturating_mul(60_000))
            .unwrap_or_else(|| self.config.session_ms());
        self.session
            .start(target_ms, now)
            .map_err(|r| rejected("start_session", r))?;
        self.persist()?;

        tracing::info!(target_ms, "session started");
        Ok(vec![Event::SessionStarted {
            target_ms: self.session.target_ms(),
            at: to_datetime(now),
        }])
    }

    pub fn pause_session(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        if self.session.state() != SessionState::Running {
            return Err(rejected("pause_session", Rejection::SessionNotRunning));
        }
        let mut events = self.flush(now);
        if self.session.state() == SessionState::Running {
            self.session
                .pause(now)
                .map_err(|r| rejected("pause_session", r))?;
            events.push(Event::SessionPaused {
                remaining_ms: self.session.remaining_ms(),
                at: to_datetime(now),
            });
        }
        self.persist()?;
        Ok(events)
    }

    pub fn resume_session(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        self.session
            .resume(now)
            .map_err(|r| rejected("resume_session", r))?;
        self.persist()?;
        Ok(vec![Event::SessionResumed {
            remaining_ms: self.session.remaining_ms(),
            at: to_datetime(now),
        }])
    }

    /// Turn running time since the last tick into session ego.
    pub fn tick(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let events = self.flush(now);
        if !events.is_empty() {
            self.persist()?;
        }
        Ok(events)
    }

    /// Commit the current session, running or not. Ends it early if the
    /// countdown has not run out.
    pub fn finish_session(&mut self) -> Result<(CompletedSession, Vec<Event>)> {
        let now = self.clock.now_ms();
        if !self.session.in_progress() {
            return Err(rejected("finish_session", Rejection::SessionNotRunning));
        }
        let mut events = self.flush(now);
        let at = to_datetime(now);
        let today = day_of(now);

        let meditated_ms = self.session.elapsed_ms();
        let started_at = to_datetime(self.session.started_at_ms().unwrap_or(now));
        let earned = self.progression.commit_session();
        self.wall.record(now);
        self.session.reset();
        events.push(Event::SessionCommitted {
            earned,
            meditated_ms,
            total: self.progression.total(),
            lifetime: self.progression.lifetime(),
            at,
        });

        let change = self.streak.record_completion(today);
        if change != StreakChange::Unchanged {
            events.push(Event::StreakChanged {
                change,
                days: self.streak.current(today),
                at,
            });
        }

        self.pet.cheer(
            self.config.pet.session_mood_bonus,
            now,
            self.config.pet.decay_per_hour,
        );

        self.quests.roll_over(today);
        self.record_quest(QuestKind::SessionsCompleted, 1, at, &mut events);
        self.record_quest(QuestKind::MinutesMeditated, meditated_ms / 60_000, at, &mut events);

        self.unlock_new(at, &mut events);
        self.persist()?;

        tracing::info!(
            earned,
            meditated_ms,
            lifetime = self.progression.lifetime(),
            "session committed"
        );
        let summary = CompletedSession {
            earned,
            meditated_ms,
            started_at,
            completed_at: at,
        };
        Ok((summary, events))
    }

    /// Abandon the current session. Its ego is forfeited and the wait wall
    /// is left alone.
    pub fn discard_session(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        if !self.session.in_progress() {
            return Err(rejected("discard_session", Rejection::SessionNotRunning));
        }
        let forfeited = self.progression.discard_session();
        self.session.reset();
        self.persist()?;
        tracing::info!(forfeited, "session discarded");
        Ok(vec![Event::SessionDiscarded {
            forfeited,
            at: to_datetime(now),
        }])
    }

    // ── Upgrades & truths ────────────────────────────────────────────

    pub fn purchase_upgrade(&mut self, id: &str) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let at = to_datetime(now);
        // Check before flushing so a rejection leaves the session untouched
        let cost = self
            .upgrades
            .cost(id)
            .map_err(|r| rejected("purchase_upgrade", r))?
            .ok_or_else(|| rejected("purchase_upgrade", Rejection::UpgradeMaxed(id.to_string())))?;
        if self.progression.total() < cost {
            return Err(rejected(
                "purchase_upgrade",
                Rejection::InsufficientEgo {
                    cost,
                    balance: self.progression.total(),
                },
            ));
        }

        let mut events = self.flush(now);
        let purchase = self
            .upgrades
            .purchase(id, &mut self.progression)
            .map_err(|r| rejected("purchase_upgrade", r))?;
        tracing::info!(
            id = %purchase.id,
            level = purchase.new_level,
            cost = purchase.cost,
            "upgrade purchased"
        );
        events.push(Event::UpgradePurchased {
            id: purchase.id,
            new_level: purchase.new_level,
            cost: purchase.cost,
            multiplier: self.upgrades.total_multiplier(),
            at,
        });

        self.quests.roll_over(day_of(now));
        self.record_quest(QuestKind::UpgradesBought, 1, at, &mut events);
        self.persist()?;
        Ok(events)
    }

    /// Unlock every truth lifetime ego now pays for.
    pub fn check_unlocks(&mut self) -> Result<Vec<Event>> {
        let at = to_datetime(self.clock.now_ms());
        let mut events = Vec::new();
        self.unlock_new(at, &mut events);
        if !events.is_empty() {
            self.persist()?;
        }
        Ok(events)
    }

    pub fn mark_truth_seen(&mut self, rank: u8) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let at = to_datetime(now);
        let first_time = self
            .unlocks
            .mark_seen(rank)
            .map_err(|r| rejected("mark_truth_seen", r))?;
        let mut events = Vec::new();
        if first_time {
            events.push(Event::TruthSeen { rank, at });
            self.quests.roll_over(day_of(now));
            self.record_quest(QuestKind::TruthsRead, 1, at, &mut events);
            self.persist()?;
        }
        Ok(events)
    }

    // ── Wait wall, boosts, wallet, pet, quests ───────────────────────

    /// Pay karma to clear an active wait wall. Free and silent when the wall
    /// is already down.
    pub fn bypass_wait_wall(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        if !self.wall.is_active(now) {
            return Ok(Vec::new());
        }
        let cost = self.config.wait_wall.bypass_karma_cost;
        self.wallet
            .spend(Currency::Karma, cost)
            .map_err(|r| rejected("bypass_wait_wall", r))?;
        self.wall.bypass();
        self.persist()?;
        tracing::info!(karma = cost, "wait wall bypassed");
        Ok(vec![Event::WaitWallBypassed {
            karma_spent: cost,
            at: to_datetime(now),
        }])
    }

    /// Spend stardust on the configured boost.
    pub fn activate_boost(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let cost = self.config.boost.stardust_cost;

        let mut wallet = self.wallet;
        wallet
            .spend(Currency::Stardust, cost)
            .map_err(|r| rejected("activate_boost", r))?;
        let mut boost = self.boost;
        boost
            .activate(self.config.boost.multiplier, self.config.boost_ms(), now)
            .map_err(|r| rejected("activate_boost", r))?;

        let mut events = self.flush(now);
        self.wallet = wallet;
        self.boost = boost;
        self.persist()?;

        tracing::info!(
            multiplier = boost.multiplier,
            expiry_ms = boost.expiry_ms,
            "boost activated"
        );
        events.push(Event::BoostActivated {
            multiplier: boost.multiplier,
            expires_at: to_datetime(boost.expiry_ms),
            stardust_spent: cost,
            at: to_datetime(now),
        });
        Ok(events)
    }

    /// Credit stardust from a rewarded ad or any other outside source.
    pub fn grant_stardust(&mut self, amount: u64) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let balance = self.wallet.earn(Currency::Stardust, amount);
        self.persist()?;
        tracing::info!(amount, balance, "stardust granted");
        Ok(vec![Event::StardustGranted {
            amount,
            balance,
            at: to_datetime(now),
        }])
    }

    pub fn feed_pet(&mut self) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let cost = self.config.pet.feed_stardust_cost;
        self.wallet
            .spend(Currency::Stardust, cost)
            .map_err(|r| rejected("feed_pet", r))?;
        let mood = self.pet.cheer(
            self.config.pet.feed_amount,
            now,
            self.config.pet.decay_per_hour,
        );
        self.persist()?;
        Ok(vec![Event::PetFed {
            mood,
            stardust_spent: cost,
            at: to_datetime(now),
        }])
    }

    pub fn claim_quest(&mut self, id: &str) -> Result<Vec<Event>> {
        let now = self.clock.now_ms();
        let rolled = self.quests.roll_over(day_of(now));
        let karma = match self.quests.claim(id) {
            Ok(karma) => karma,
            Err(r) => {
                if rolled {
                    self.persist()?;
                }
                return Err(rejected("claim_quest", r));
            }
        };
        self.wallet.earn(Currency::Karma, karma);
        self.persist()?;
        tracing::info!(id, karma, "quest claimed");
        Ok(vec![Event::QuestClaimed {
            id: id.to_string(),
            karma,
            at: to_datetime(now),
        }])
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rate_model(&self, boost_multiplier: f64) -> RateModel {
        RateModel {
            base_rate: self.config.economy.base_rate,
            upgrade_multiplier: self.upgrades.total_multiplier(),
            boost_multiplier,
        }
    }

    /// Pay out running time up to `now`.
    ///
    /// The span actually run is `[last_tick, last_tick + elapsed]`, which
    /// ends before `now` when the countdown ran out in between. It is split
    /// at the boost expiry and the session bonus is integrated across it, so
    /// the payout does not depend on how often this is called.
    fn flush(&mut self, now: u64) -> Vec<Event> {
        let start = self.session.last_tick_ms().unwrap_or(now);
        let before_ms = self.session.elapsed_ms();
        let elapsed_ms = self.session.tick(now);
        let mut events = Vec::new();
        if elapsed_ms == 0 {
            return events;
        }

        let streak_days = self.streak.current(day_of(now));
        let boosted_ms = self
            .boost
            .expiry_ms
            .saturating_sub(start)
            .min(elapsed_ms);

        let from = before_ms as f64 / 60_000.0;
        let split = (before_ms + boosted_ms) as f64 / 60_000.0;
        let to = (before_ms + elapsed_ms) as f64 / 60_000.0;
        let amount = self
            .rate_model(self.boost.multiplier)
            .earned_between(streak_days, from, split)
            + self.rate_model(1.0).earned_between(streak_days, split, to);
        let earned = self.progression.credit(amount);

        let at = to_datetime(now);
        tracing::debug!(elapsed_ms, boosted_ms, earned, "accumulated");
        events.push(Event::EgoAccumulated {
            elapsed_ms,
            earned,
            session_total: self.progression.session(),
            rate_per_second: amount / (elapsed_ms as f64 / 1000.0),
            at,
        });
        if self.session.state() == SessionState::Completed {
            tracing::info!("session countdown finished");
            events.push(Event::SessionCompleted { at });
        }
        events
    }

    fn unlock_new(&mut self, at: DateTime<Utc>, events: &mut Vec<Event>) {
        for rank in self.unlocks.check_unlocks(self.progression.lifetime()) {
            tracing::info!(rank, "truth unlocked");
            events.push(Event::TruthUnlocked { rank, at });
        }
    }

    fn record_quest(
        &mut self,
        kind: QuestKind,
        amount: u64,
        at: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) {
        for progress in self.quests.record(kind, amount) {
            events.push(Event::QuestProgressed { progress, at });
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.progression.save(&mut self.store)?;
        self.boost.save(&mut self.store)?;
        self.upgrades.save(&mut self.store)?;
        self.unlocks.save(&mut self.store)?;
        self.wall.save(&mut self.store)?;
        self.streak.save(&mut self.store)?;
        self.wallet.save(&mut self.store)?;
        self.pet.save(&mut self.store)?;
        self.quests.save(&mut self.store)?;
        self.store.put_json(KEY_SESSION, &self.session)?;
        Ok(())
    }
}

impl<C: Clock> EgoEngine<Database, C> {
    /// Finish the session and append it to the session history.
    pub fn finish_and_record(&mut self) -> Result<(CompletedSession, Vec<Event>)> {
        let (summary, events) = self.finish_session()?;
        self.store.record_session(
            summary.meditated_ms / 1000,
            summary.earned,
            summary.started_at,
            summary.completed_at,
        )?;
        Ok((summary, events))
    }
}

fn rejected(op: &'static str, rejection: Rejection) -> crate::error::CoreError {
    tracing::debug!(op, reason = %rejection, "operation rejected");
    rejection.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    const NOW: u64 = 1_717_977_600_000;

    fn engine() -> EgoEngine<MemoryStore, ManualClock> {
        EgoEngine::load(MemoryStore::new(), ManualClock::new(NOW), Config::default()).unwrap()
    }

    fn rejection<T: std::fmt::Debug>(result: Result<T>) -> Rejection {
        match result {
            Err(CoreError::Rejected(r)) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn ten_seconds_at_base_rate() {
        let mut engine = engine();
        engine.start_session(Some(10)).unwrap();
        engine.clock().advance_secs(10);
        let events = engine.tick().unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::EgoAccumulated { elapsed_ms: 10_000, earned: 10, .. }]
        ));
        assert_eq!(engine.progression().session(), 10);
        assert_eq!(engine.progression().total(), 0);
    }

    #[test]
    fn paused_time_earns_nothing() {
        let mut engine = engine();
        engine.start_session(Some(10)).unwrap();
        engine.clock().advance_secs(5);
        engine.pause_session().unwrap();
        engine.clock().advance_secs(600);
        assert!(engine.tick().unwrap().is_empty());
        engine.resume_session().unwrap();
        assert_eq!(engine.progression().session(), 5);
    }

    #[test]
    fn finish_commits_and_raises_wall() {
        let mut engine = engine();
        engine.start_session(Some(1)).unwrap();
        engine.clock().advance_secs(120);
        let (summary, events) = engine.finish_session().unwrap();
        assert_eq!(summary.meditated_ms, 60_000);
        assert_eq!(engine.progression().total(), summary.earned);
        assert_eq!(engine.progression().lifetime(), summary.earned);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { .. })));
        assert!(engine.wait_wall().is_active(engine.clock().now_ms()));
        assert_eq!(engine.session().state(), SessionState::Idle);
        assert_eq!(engine.streak().current(day_of(NOW)), 1);

        assert!(matches!(
            rejection(engine.start_session(None)),
            Rejection::WaitWallActive { .. }
        ));
    }

    #[test]
    fn discard_forfeits_session_ego() {
        let mut engine = engine();
        engine.start_session(Some(10)).unwrap();
        engine.clock().advance_secs(30);
        engine.tick().unwrap();
        let events = engine.discard_session().unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::SessionDiscarded { forfeited: 30, .. }]
        ));
        assert_eq!(engine.progression().total(), 0);
        assert!(!engine.wait_wall().is_active(engine.clock().now_ms()));
    }

    #[test]
    fn rejections_leave_store_untouched() {
        let mut engine = engine();
        assert_eq!(
            rejection(engine.purchase_upgrade("incense")),
            Rejection::InsufficientEgo {
                cost: 50,
                balance: 0
            }
        );
        assert_eq!(rejection(engine.pause_session()), Rejection::SessionNotRunning);
        assert_eq!(
            rejection(engine.feed_pet()),
            Rejection::InsufficientFunds {
                currency: "stardust",
                cost: 3,
                balance: 0
            }
        );
        assert!(engine.store().is_empty());
    }

    #[test]
    fn second_start_is_rejected() {
        let mut engine = engine();
        engine.start_session(None).unwrap();
        assert_eq!(
            rejection(engine.start_session(None)),
            Rejection::SessionInProgress
        );
    }

    fn assert_near(actual: u64, expected: u64) {
        assert!(
            actual.abs_diff(expected) <= 1,
            "expected about {expected}, got {actual}"
        );
    }

    #[test]
    fn boost_applies_only_until_expiry() {
        let mut engine = engine();
        engine.grant_stardust(10).unwrap();
        engine.start_session(Some(60)).unwrap();
        engine.activate_boost().unwrap();
        // Bonus-minutes: 39 over the boosted first 30, 17 over the next 10
        engine.clock().advance_secs(40 * 60);
        let events = engine.tick().unwrap();
        assert_near(engine.progression().session(), (39 * 2 + 17) * 60);
        assert_eq!(engine.wallet().stardust, 0);

        // The reported rate is the span average, not the boosted rate
        match events.as_slice() {
            [Event::EgoAccumulated { rate_per_second, .. }] => {
                assert!((rate_per_second - 95.0 * 60.0 / 2400.0).abs() < 1e-9);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn boost_covers_a_countdown_that_ended_before_finishing() {
        let mut engine = engine();
        engine.grant_stardust(10).unwrap();
        engine.start_session(Some(10)).unwrap();
        engine.activate_boost().unwrap();
        // The 10 minute countdown ran out inside the 30 minute boost
        engine.clock().advance_secs(40 * 60);
        let (summary, _) = engine.finish_session().unwrap();
        assert_eq!(summary.meditated_ms, 10 * 60_000);
        // 11 bonus-minutes at 2x
        assert_near(summary.earned, 11 * 60 * 2);
    }

    #[test]
    fn payout_ignores_tick_cadence() {
        let mut ticked = engine();
        let mut single = engine();
        ticked.start_session(Some(50)).unwrap();
        single.start_session(Some(50)).unwrap();
        for _ in 0..50 * 60 {
            ticked.clock().advance_secs(1);
            ticked.tick().unwrap();
        }
        single.clock().advance_secs(50 * 60);
        let (a, _) = ticked.finish_session().unwrap();
        let (b, _) = single.finish_session().unwrap();
        assert_near(b.earned, 4_500);
        assert_near(a.earned, b.earned);
    }

    #[test]
    fn boost_without_stardust_changes_nothing() {
        let mut engine = engine();
        engine.grant_stardust(9).unwrap();
        assert!(matches!(
            rejection(engine.activate_boost()),
            Rejection::InsufficientFunds { .. }
        ));
        assert_eq!(engine.wallet().stardust, 9);
        assert!(!engine.boost().is_active(NOW));
    }

    #[test]
    fn bypass_costs_karma_only_when_active() {
        let mut engine = engine();
        assert!(engine.bypass_wait_wall().unwrap().is_empty());

        engine.start_session(Some(1)).unwrap();
        engine.clock().advance_secs(60);
        engine.finish_session().unwrap();
        assert!(matches!(
            rejection(engine.bypass_wait_wall()),
            Rejection::InsufficientFunds { currency: "karma", .. }
        ));
    }

    #[test]
    fn feeding_costs_stardust() {
        let mut engine = engine();
        engine.grant_stardust(5).unwrap();
        engine.feed_pet().unwrap();
        assert_eq!(engine.wallet().stardust, 2);
    }

    #[test]
    fn state_survives_reload() {
        let mut engine = engine();
        engine.start_session(Some(5)).unwrap();
        engine.clock().advance_secs(90);
        engine.pause_session().unwrap();
        let session = engine.session().clone();
        let earned = engine.progression().session();

        let store = engine.into_store();
        let reloaded =
            EgoEngine::load(store, ManualClock::new(NOW + 200_000), Config::default()).unwrap();
        assert_eq!(reloaded.session(), &session);
        assert_eq!(reloaded.progression().session(), earned);
    }

    #[test]
    fn snapshot_reports_state() {
        let engine = engine();
        let snap = engine.snapshot();
        assert_eq!(snap.ego.total, 0);
        assert_eq!(snap.session.state, SessionState::Idle);
        assert_eq!(snap.truths.highest_unlocked_rank, 100);
        assert_eq!(snap.truths.next_threshold, Some(100));
        assert_eq!(snap.quests.quests.len(), 3);
        assert_eq!(snap.pet.label, Mood::Ecstatic);
        assert_eq!(snap.claimable_quests, 0);
        assert_eq!(snap.upgrades.levels_bought, 0);
        assert_eq!(snap.ego.grouped, "0");
        assert!(!snap.wait_wall.active);
        assert_eq!(snap.rate.per_second, 1.0);
    }
}

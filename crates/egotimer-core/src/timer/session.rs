//! Meditation session timer.
//!
//! A wall-clock countdown. It does not use internal threads - the caller
//! passes the current time into every command and calls `tick()`
//! periodically. Each tick reports how much *running* time passed, which is
//! what the engine turns into spiritual ego.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!       Completed -> Idle (finish / discard)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero; waiting for the session to be finished.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationSession {
    state: SessionState,
    target_ms: u64,
    /// Remaining countdown in milliseconds.
    remaining_ms: u64,
    /// When the session was started (epoch milliseconds).
    #[serde(default)]
    started_at_ms: Option<u64>,
    /// Last time running time was flushed. Only set while running.
    #[serde(default)]
    last_tick_ms: Option<u64>,
}

impl Default for MeditationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MeditationSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            target_ms: 0,
            remaining_ms: 0,
            started_at_ms: None,
            last_tick_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target_ms(&self) -> u64 {
        self.target_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Start of the running span the next tick will pay for.
    pub fn last_tick_ms(&self) -> Option<u64> {
        self.last_tick_ms
    }

    /// Running time so far.
    pub fn elapsed_ms(&self) -> u64 {
        self.target_ms.saturating_sub(self.remaining_ms)
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_ms() as f64 / 60_000.0
    }

    /// 0.0 .. 1.0 progress through the countdown.
    pub fn progress(&self) -> f64 {
        if self.target_ms == 0 {
            return 0.0;
        }
        self.elapsed_ms() as f64 / self.target_ms as f64
    }

    /// Running, paused, or completed but not yet finished.
    pub fn in_progress(&self) -> bool {
        self.state != SessionState::Idle
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, target_ms: u64, now_ms: u64) -> Result<(), Rejection> {
        if self.in_progress() {
            return Err(Rejection::SessionInProgress);
        }
        let target_ms = target_ms.max(1);
        self.state = SessionState::Running;
        self.target_ms = target_ms;
        self.remaining_ms = target_ms;
        self.started_at_ms = Some(now_ms);
        self.last_tick_ms = Some(now_ms);
        Ok(())
    }

    /// Pause, returning running time flushed since the last tick.
    pub fn pause(&mut self, now_ms: u64) -> Result<u64, Rejection> {
        if self.state != SessionState::Running {
            return Err(Rejection::SessionNotRunning);
        }
        let elapsed = self.flush_elapsed(now_ms);
        if self.state == SessionState::Running {
            self.state = SessionState::Paused;
        }
        self.last_tick_ms = None;
        Ok(elapsed)
    }

    pub fn resume(&mut self, now_ms: u64) -> Result<(), Rejection> {
        if self.state != SessionState::Paused {
            return Err(Rejection::SessionNotRunning);
        }
        self.state = SessionState::Running;
        self.last_tick_ms = Some(now_ms);
        Ok(())
    }

    /// Call periodically. Returns running milliseconds since the previous
    /// tick; moves to `Completed` when the countdown runs out.
    pub fn tick(&mut self, now_ms: u64) -> u64 {
        match self.state {
            SessionState::Running => self.flush_elapsed(now_ms),
            _ => 0,
        }
    }

    /// Back to idle. Used after the session was committed or discarded.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: u64) -> u64 {
        let Some(last) = self.last_tick_ms else {
            return 0;
        };
        let elapsed = now_ms.saturating_sub(last).min(self.remaining_ms);
        self.remaining_ms -= elapsed;
        self.last_tick_ms = Some(now_ms.max(last));
        if self.remaining_ms == 0 {
            self.state = SessionState::Completed;
            self.last_tick_ms = None;
        }
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pause_resume() {
        let mut session = MeditationSession::new();
        assert_eq!(session.state(), SessionState::Idle);

        session.start(60_000, 0).unwrap();
        assert_eq!(session.state(), SessionState::Running);

        assert_eq!(session.pause(10_000).unwrap(), 10_000);
        assert_eq!(session.state(), SessionState::Paused);

        // Paused time is not counted
        assert_eq!(session.tick(40_000), 0);
        session.resume(40_000).unwrap();
        assert_eq!(session.tick(45_000), 5_000);
        assert_eq!(session.elapsed_ms(), 15_000);
        assert_eq!(session.remaining_ms(), 45_000);
    }

    #[test]
    fn cannot_start_twice() {
        let mut session = MeditationSession::new();
        session.start(1_000, 0).unwrap();
        assert_eq!(session.start(1_000, 10), Err(Rejection::SessionInProgress));
    }

    #[test]
    fn pause_and_resume_need_matching_state() {
        let mut session = MeditationSession::new();
        assert_eq!(session.pause(0), Err(Rejection::SessionNotRunning));
        assert_eq!(session.resume(0), Err(Rejection::SessionNotRunning));
        session.start(1_000, 0).unwrap();
        assert_eq!(session.resume(0), Err(Rejection::SessionNotRunning));
    }

    #[test]
    fn tick_clamps_to_remaining_and_completes() {
        let mut session = MeditationSession::new();
        session.start(60_000, 1_000).unwrap();
        assert_eq!(session.tick(500_000), 60_000);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.tick(900_000), 0);
        assert_eq!(session.progress(), 1.0);
        assert!(session.in_progress());
    }

    #[test]
    fn last_tick_marks_the_unpaid_span() {
        let mut session = MeditationSession::new();
        assert_eq!(session.last_tick_ms(), None);
        session.start(60_000, 1_000).unwrap();
        assert_eq!(session.last_tick_ms(), Some(1_000));
        session.tick(11_000);
        assert_eq!(session.last_tick_ms(), Some(11_000));
        session.pause(12_000).unwrap();
        assert_eq!(session.last_tick_ms(), None);
    }

    #[test]
    fn clock_going_backwards_counts_nothing() {
        let mut session = MeditationSession::new();
        session.start(60_000, 10_000).unwrap();
        assert_eq!(session.tick(5_000), 0);
        assert_eq!(session.tick(12_000), 2_000);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = MeditationSession::new();
        session.start(60_000, 0).unwrap();
        session.tick(30_000);
        session.reset();
        assert_eq!(session, MeditationSession::new());
    }

    #[test]
    fn serde_roundtrip_keeps_countdown() {
        let mut session = MeditationSession::new();
        session.start(60_000, 0).unwrap();
        session.tick(20_000);
        let json = serde_json::to_string(&session).unwrap();
        let back: MeditationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
        assert!(json.contains("\"running\""));
    }
}

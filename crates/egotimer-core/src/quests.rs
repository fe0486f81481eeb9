//! Daily quests.
//!
//! Every UTC day gets three quests drawn from a fixed pool. The draw is
//! seeded by the date, so every reload on the same day shows the same
//! board. Progress arrives from engine activity; a finished quest can be
//! claimed once for karma.

use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{Rejection, StoreError};
use crate::storage::KvStore;

const KEY_BOARD: &str = "quests.board";

pub const QUESTS_PER_DAY: usize = 3;

const SEED_SALT: u64 = 0x6567_6f74_696d_6572;

/// What a quest counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    MinutesMeditated,
    SessionsCompleted,
    UpgradesBought,
    TruthsRead,
}

struct QuestTemplate {
    id: &'static str,
    kind: QuestKind,
    target: u64,
    reward_karma: u64,
    description: &'static str,
}

static POOL: [QuestTemplate; 8] = [
    QuestTemplate {
        id: "sit_10",
        kind: QuestKind::MinutesMeditated,
        target: 10,
        reward_karma: 10,
        description: "Sit still for 10 minutes. Tell nobody. (Tell everybody.)",
    },
    QuestTemplate {
        id: "sit_30",
        kind: QuestKind::MinutesMeditated,
        target: 30,
        reward_karma: 25,
        description: "Meditate for 30 minutes total.",
    },
    QuestTemplate {
        id: "sit_60",
        kind: QuestKind::MinutesMeditated,
        target: 60,
        reward_karma: 50,
        description: "An hour of stillness. Your ego is growing nicely.",
    },
    QuestTemplate {
        id: "sessions_1",
        kind: QuestKind::SessionsCompleted,
        target: 1,
        reward_karma: 5,
        description: "Finish one session.",
    },
    QuestTemplate {
        id: "sessions_3",
        kind: QuestKind::SessionsCompleted,
        target: 3,
        reward_karma: 20,
        description: "Finish three sessions. Humbly.",
    },
    QuestTemplate {
        id: "shopping_1",
        kind: QuestKind::UpgradesBought,
        target: 1,
        reward_karma: 10,
        description: "Invest in your spiritual brand.",
    },
    QuestTemplate {
        id: "shopping_3",
        kind: QuestKind::UpgradesBought,
        target: 3,
        reward_karma: 30,
        description: "Buy three upgrades. Detachment can wait.",
    },
    QuestTemplate {
        id: "read_1",
        kind: QuestKind::TruthsRead,
        target: 1,
        reward_karma: 15,
        description: "Read a truth you were not ready for.",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub kind: QuestKind,
    pub description: String,
    pub target: u64,
    pub progress: u64,
    pub reward_karma: u64,
    pub claimed: bool,
}

impl Quest {
    fn from_template(t: &QuestTemplate) -> Self {
        Self {
            id: t.id.to_string(),
            kind: t.kind,
            description: t.description.to_string(),
            target: t.target,
            progress: 0,
            reward_karma: t.reward_karma,
            claimed: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }
}

/// A quest that moved after some activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub id: String,
    pub progress: u64,
    pub target: u64,
    /// This update is the one that finished it.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestBoard {
    pub day: NaiveDate,
    pub quests: Vec<Quest>,
}

impl QuestBoard {
    /// The board for `day`. Always the same for the same date.
    pub fn generate(day: NaiveDate) -> Self {
        let seed = (day.num_days_from_ce() as i64 as u64) ^ SEED_SALT;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut quests: Vec<Quest> = POOL
            .choose_multiple(&mut rng, QUESTS_PER_DAY)
            .map(Quest::from_template)
            .collect();
        quests.sort_by(|a, b| a.id.cmp(&b.id));
        Self { day, quests }
    }

    /// Swap in a fresh board if `today` moved on. Returns whether it reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.day == today {
            return false;
        }
        tracing::debug!(from = %self.day, to = %today, "new quest day");
        *self = Self::generate(today);
        true
    }

    /// Count `amount` of `kind` towards every open quest of that kind.
    pub fn record(&mut self, kind: QuestKind, amount: u64) -> Vec<QuestProgress> {
        if amount == 0 {
            return Vec::new();
        }
        self.quests
            .iter_mut()
            .filter(|q| q.kind == kind && !q.is_complete())
            .map(|q| {
                q.progress = q.progress.saturating_add(amount).min(q.target);
                QuestProgress {
                    id: q.id.clone(),
                    progress: q.progress,
                    target: q.target,
                    completed: q.is_complete(),
                }
            })
            .collect()
    }

    /// Claim a finished quest. Returns the karma reward.
    pub fn claim(&mut self, id: &str) -> Result<u64, Rejection> {
        let quest = self
            .quests
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| Rejection::UnknownQuest(id.to_string()))?;
        if quest.claimed {
            return Err(Rejection::QuestClaimed(id.to_string()));
        }
        if !quest.is_complete() {
            return Err(Rejection::QuestIncomplete(id.to_string()));
        }
        quest.claimed = true;
        Ok(quest.reward_karma)
    }

    /// Claimable right now.
    pub fn claimable(&self) -> usize {
        self.quests
            .iter()
            .filter(|q| q.is_complete() && !q.claimed)
            .count()
    }

    /// Today's board. Missing, malformed or stale data yields a new one.
    pub fn load<S: KvStore>(store: &S, today: NaiveDate) -> Result<Self, StoreError> {
        match store.get_json::<Self>(KEY_BOARD)? {
            Some(board) if board.day == today && board.quests.len() == QUESTS_PER_DAY => {
                Ok(board)
            }
            _ => Ok(Self::generate(today)),
        }
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        store.put_json(KEY_BOARD, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn same_day_same_board() {
        assert_eq!(QuestBoard::generate(day(10)), QuestBoard::generate(day(10)));
    }

    #[test]
    fn board_has_distinct_quests() {
        let board = QuestBoard::generate(day(10));
        assert_eq!(board.quests.len(), QUESTS_PER_DAY);
        let mut ids: Vec<_> = board.quests.iter().map(|q| q.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), QUESTS_PER_DAY);
        assert!(board.quests.iter().all(|q| q.progress == 0 && !q.claimed));
    }

    #[test]
    fn boards_vary_across_days() {
        let first = QuestBoard::generate(day(1)).quests;
        assert!((2..=30).any(|d| QuestBoard::generate(day(d)).quests != first));
    }

    #[test]
    fn roll_over_resets_progress() {
        let mut board = QuestBoard::generate(day(10));
        for q in &mut board.quests {
            q.progress = q.target;
        }
        assert!(!board.roll_over(day(10)));
        assert_eq!(board.claimable(), QUESTS_PER_DAY);
        assert!(board.roll_over(day(11)));
        assert_eq!(board.day, day(11));
        assert_eq!(board.claimable(), 0);
    }

    #[test]
    fn record_progress_and_claim() {
        let mut board = QuestBoard::generate(day(10));
        let quest = board.quests[0].clone();

        assert_eq!(
            board.claim(&quest.id),
            Err(Rejection::QuestIncomplete(quest.id.clone()))
        );

        let updates = board.record(quest.kind, quest.target + 5);
        let update = updates.iter().find(|u| u.id == quest.id).unwrap();
        assert!(update.completed);
        assert_eq!(update.progress, quest.target);

        assert_eq!(board.claim(&quest.id), Ok(quest.reward_karma));
        assert_eq!(
            board.claim(&quest.id),
            Err(Rejection::QuestClaimed(quest.id.clone()))
        );
    }

    #[test]
    fn completed_quests_stop_reporting() {
        let mut board = QuestBoard::generate(day(10));
        let quest = board.quests[0].clone();
        board.record(quest.kind, quest.target);
        assert!(board
            .record(quest.kind, 1)
            .iter()
            .all(|u| u.id != quest.id));
    }

    #[test]
    fn unknown_quest_is_rejected() {
        let mut board = QuestBoard::generate(day(10));
        assert_eq!(
            board.claim("levitate"),
            Err(Rejection::UnknownQuest("levitate".into()))
        );
    }

    #[test]
    fn zero_amount_is_ignored() {
        let mut board = QuestBoard::generate(day(10));
        let kind = board.quests[0].kind;
        assert!(board.record(kind, 0).is_empty());
    }

    #[test]
    fn persists_within_the_day() {
        let mut store = MemoryStore::new();
        let mut board = QuestBoard::generate(day(10));
        let kind = board.quests[0].kind;
        board.record(kind, 1);
        board.save(&mut store).unwrap();
        assert_eq!(QuestBoard::load(&store, day(10)).unwrap(), board);
    }

    #[test]
    fn stale_board_is_replaced() {
        let mut store = MemoryStore::new();
        let mut board = QuestBoard::generate(day(10));
        let kind = board.quests[0].kind;
        board.record(kind, 1);
        board.save(&mut store).unwrap();
        assert_eq!(
            QuestBoard::load(&store, day(11)).unwrap(),
            QuestBoard::generate(day(11))
        );
    }

    #[test]
    fn malformed_board_regenerates() {
        let mut store = MemoryStore::new();
        store.put(KEY_BOARD, "{\"day\": 42").unwrap();
        assert_eq!(
            QuestBoard::load(&store, day(10)).unwrap(),
            QuestBoard::generate(day(10))
        );
    }
}

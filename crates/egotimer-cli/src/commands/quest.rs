use clap::Subcommand;
use egotimer_core::QuestBoard;
use serde::Serialize;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum QuestAction {
    /// Today's quest board
    List,
    /// Claim the karma for a completed quest
    Claim {
        /// Quest id from `quest list`
        id: String,
    },
}

#[derive(Serialize)]
struct BoardListing {
    #[serde(flatten)]
    board: QuestBoard,
    claimable: usize,
}

pub fn run(action: QuestAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        QuestAction::List => {
            let board = engine.quests();
            let claimable = board.claimable();
            print_json(&BoardListing { board, claimable })
        }
        QuestAction::Claim { id } => print_events(&engine.claim_quest(&id)?),
    }
}

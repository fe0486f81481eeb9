use clap::Subcommand;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum TruthAction {
    /// List all 100 truths with threshold and unlocked/seen flags
    List {
        /// Only show unlocked truths
        #[arg(long)]
        unlocked: bool,
    },
    /// Unlock everything lifetime ego now pays for
    Check,
    /// Mark an unlocked truth as read
    Seen {
        /// Rank, 1..=100
        rank: u8,
    },
}

pub fn run(action: TruthAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        TruthAction::List { unlocked } => {
            let mut truths = engine.unlocks().truths();
            if unlocked {
                let ranks = engine.unlocks().unlocked_ranks();
                truths.retain(|t| ranks.contains(&t.rank));
            }
            print_json(&truths)
        }
        TruthAction::Check => print_events(&engine.check_unlocks()?),
        TruthAction::Seen { rank } => print_events(&engine.mark_truth_seen(rank)?),
    }
}

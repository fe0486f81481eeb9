use clap::Subcommand;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum PetAction {
    /// Current mood
    Status,
    /// Spend stardust on food
    Feed,
}

pub fn run(action: PetAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        PetAction::Status => print_json(&engine.snapshot().pet),
        PetAction::Feed => print_events(&engine.feed_pet()?),
    }
}

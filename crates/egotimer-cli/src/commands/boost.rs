use clap::Subcommand;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum BoostAction {
    /// Spend stardust on the configured boost
    Activate,
    /// Current boost multiplier and time left
    Status,
}

pub fn run(action: BoostAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        BoostAction::Activate => print_events(&engine.activate_boost()?),
        BoostAction::Status => print_json(&engine.snapshot().boost),
    }
}

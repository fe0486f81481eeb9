use clap::Subcommand;

use super::{open_engine, print_events, CliResult};

#[derive(Subcommand)]
pub enum StardustAction {
    /// Credit stardust, as a rewarded ad would
    Grant {
        amount: u64,
    },
}

pub fn run(action: StardustAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        StardustAction::Grant { amount } => print_events(&engine.grant_stardust(amount)?),
    }
}

use clap::Subcommand;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum WallAction {
    /// Whether the wait wall is up and for how long
    Status,
    /// Spend karma to clear the wall
    Bypass,
}

pub fn run(action: WallAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        WallAction::Status => print_json(&engine.snapshot().wait_wall),
        WallAction::Bypass => print_events(&engine.bypass_wait_wall()?),
    }
}

use clap::Subcommand;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum UpgradeAction {
    /// List every upgrade with level, next cost and affordability
    List,
    /// Buy one level of an upgrade
    Buy {
        /// Upgrade id (e.g. "incense")
        id: String,
    },
}

pub fn run(action: UpgradeAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        UpgradeAction::List => print_json(&engine.upgrade_statuses()),
        UpgradeAction::Buy { id } => print_events(&engine.purchase_upgrade(&id)?),
    }
}

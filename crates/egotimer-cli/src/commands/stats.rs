use clap::Subcommand;
use egotimer_core::storage::Database;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time stats
    All,
    /// Most recent committed sessions
    Recent {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    let now = chrono::Utc::now();

    match action {
        StatsAction::Today => print_json(&db.stats_today(now)?),
        StatsAction::All => print_json(&db.stats_all(now)?),
        StatsAction::Recent { limit } => print_json(&db.recent_sessions(limit)?),
    }
}

pub mod boost;
pub mod config;
pub mod pet;
pub mod quest;
pub mod session;
pub mod stardust;
pub mod stats;
pub mod truth;
pub mod upgrade;
pub mod wall;

use egotimer_core::{Config, Database, EgoEngine, Event, SystemClock};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Engine = EgoEngine<Database, SystemClock>;

/// Open the database and load the engine with the on-disk config.
pub fn open_engine() -> Result<Engine, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    Ok(EgoEngine::load(db, SystemClock, config)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Events are printed as one JSON array, empty when nothing happened.
pub fn print_events(events: &[Event]) -> CliResult {
    print_json(events)
}

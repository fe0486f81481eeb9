use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a meditation session
    Start {
        /// Length in minutes (defaults to session.default_minutes)
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Turn running time into ego
    Tick,
    /// Commit the session, ending it early if still running
    Finish,
    /// Abandon the session and forfeit its ego
    Discard,
    /// Print the full state snapshot as JSON
    Status,
}

pub fn run(action: SessionAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        SessionAction::Start { minutes } => print_events(&engine.start_session(minutes)?),
        SessionAction::Pause => print_events(&engine.pause_session()?),
        SessionAction::Resume => print_events(&engine.resume_session()?),
        SessionAction::Tick => print_events(&engine.tick()?),
        SessionAction::Finish => {
            let (summary, events) = engine.finish_and_record()?;
            print_json(&json!({ "session": summary, "events": events }))
        }
        SessionAction::Discard => print_events(&engine.discard_session()?),
        SessionAction::Status => {
            // Flush running time so the snapshot is current
            engine.tick()?;
            print_json(&engine.snapshot())
        }
    }
}

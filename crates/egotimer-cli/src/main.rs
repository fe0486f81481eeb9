use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "egotimer", version, about = "Meditate. Accumulate spiritual ego. Repeat.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Meditation session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Upgrade shop
    Upgrade {
        #[command(subcommand)]
        action: commands::upgrade::UpgradeAction,
    },
    /// Truth Punches unlocked by lifetime ego
    Truth {
        #[command(subcommand)]
        action: commands::truth::TruthAction,
    },
    /// Cooldown between sessions
    Wall {
        #[command(subcommand)]
        action: commands::wall::WallAction,
    },
    /// Temporary earn-rate boosts
    Boost {
        #[command(subcommand)]
        action: commands::boost::BoostAction,
    },
    /// Stardust from outside rewards
    Stardust {
        #[command(subcommand)]
        action: commands::stardust::StardustAction,
    },
    /// The virtual pet
    Pet {
        #[command(subcommand)]
        action: commands::pet::PetAction,
    },
    /// Daily quests
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    // stdout carries JSON, so logs go to stderr
    let filter = EnvFilter::try_from_env("EGOTIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Upgrade { action } => commands::upgrade::run(action),
        Commands::Truth { action } => commands::truth::run(action),
        Commands::Wall { action } => commands::wall::run(action),
        Commands::Boost { action } => commands::boost::run(action),
        Commands::Stardust { action } => commands::stardust::run(action),
        Commands::Pet { action } => commands::pet::run(action),
        Commands::Quest { action } => commands::quest::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

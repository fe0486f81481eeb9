mod config;
pub mod database;
pub mod kv;

pub use config::{BoostConfig, Config, EconomyConfig, PetConfig, SessionConfig, WaitWallConfig};
pub use database::{Database, SessionRecord, Stats};
pub use kv::{KvStore, MemoryStore};

use std::path::PathBuf;

/// Returns the data directory.
///
/// `EGOTIMER_DATA_DIR` wins when set. Otherwise `~/.config/egotimer[-dev]/`,
/// with `EGOTIMER_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("EGOTIMER_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("EGOTIMER_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("egotimer-dev")
            } else {
                base_dir.join("egotimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

//! Core error types for egotimer-core.
//!
//! Storage and configuration failures are real errors. Everything the game
//! refuses to do (buying with too little ego, starting behind the wait wall)
//! is a [`Rejection`]: the operation had no effect and the caller may retry.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for egotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The game refused the operation; nothing changed
    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Domain-level refusals. None of them leave partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("insufficient spiritual ego: need {cost}, have {balance}")]
    InsufficientEgo { cost: u64, balance: u64 },

    #[error("insufficient {currency}: need {cost}, have {balance}")]
    InsufficientFunds {
        currency: &'static str,
        cost: u64,
        balance: u64,
    },

    #[error("upgrade '{0}' is already at max level")]
    UpgradeMaxed(String),

    #[error("unknown upgrade '{0}'")]
    UnknownUpgrade(String),

    #[error("wait wall active for another {remaining_ms} ms")]
    WaitWallActive { remaining_ms: u64 },

    #[error("no meditation session is running")]
    SessionNotRunning,

    #[error("a meditation session is already in progress")]
    SessionInProgress,

    #[error("truth #{0} is not unlocked")]
    TruthLocked(u8),

    #[error("quest '{0}' is not complete")]
    QuestIncomplete(String),

    #[error("quest '{0}' was already claimed")]
    QuestClaimed(String),

    #[error("no quest '{0}' on today's board")]
    UnknownQuest(String),

    #[error("invalid boost: {0}")]
    InvalidBoost(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

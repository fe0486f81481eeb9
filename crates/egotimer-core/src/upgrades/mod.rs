//! Upgrade shop: a fixed catalog with geometric prices whose levels add up
//! to the earn-rate multiplier.

mod catalog;
mod state;

pub use catalog::{find, UpgradeDefinition, CATALOG};
pub use state::{Purchase, UpgradeState, UpgradeStatus};

//! The fixed upgrade list and its cost curves.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: u64,
    /// Price multiplier per level already owned. Always > 1.
    pub cost_growth: f64,
    /// Added to the rate multiplier per level.
    pub effect_per_level: f64,
    pub max_level: u32,
}

pub static CATALOG: [UpgradeDefinition; 6] = [
    UpgradeDefinition {
        id: "incense",
        name: "Artisanal Incense",
        description: "Smells like enlightenment. Mostly sandalwood.",
        base_cost: 50,
        cost_growth: 1.15,
        effect_per_level: 0.10,
        max_level: 50,
    },
    UpgradeDefinition {
        id: "singing_bowl",
        name: "Himalayan Singing Bowl",
        description: "Made in a factory, but the factory was very calm.",
        base_cost: 400,
        cost_growth: 1.18,
        effect_per_level: 0.25,
        max_level: 40,
    },
    UpgradeDefinition {
        id: "yoga_mat",
        name: "Ethically Sourced Yoga Mat",
        description: "Every fibre has been told it is valid.",
        base_cost: 2_500,
        cost_growth: 1.20,
        effect_per_level: 0.50,
        max_level: 30,
    },
    UpgradeDefinition {
        id: "guru",
        name: "Guru Subscription",
        description: "Wisdom, billed monthly. Cancel anytime (you won't).",
        base_cost: 20_000,
        cost_growth: 1.25,
        effect_per_level: 1.0,
        max_level: 25,
    },
    UpgradeDefinition {
        id: "retreat",
        name: "Silent Retreat Selfies",
        description: "Nobody speaks. Everybody posts.",
        base_cost: 250_000,
        cost_growth: 1.35,
        effect_per_level: 2.5,
        max_level: 15,
    },
    UpgradeDefinition {
        id: "third_eye",
        name: "Third Eye Laser Surgery",
        description: "Not covered by insurance.",
        base_cost: 5_000_000,
        cost_growth: 1.5,
        effect_per_level: 5.0,
        max_level: 10,
    },
];

pub fn find(id: &str) -> Option<&'static UpgradeDefinition> {
    CATALOG.iter().find(|def| def.id == id)
}

impl UpgradeDefinition {
    /// `floor(base × growth^level)`, or `None` once the upgrade is maxed.
    /// Saturates at `u64::MAX`.
    pub fn cost_at(&self, level: u32) -> Option<u64> {
        if level >= self.max_level {
            return None;
        }
        let exponent = level.min(i32::MAX as u32) as i32;
        let raw = (self.base_cost as f64 * self.cost_growth.powi(exponent)).floor();
        // `as` saturates; infinity becomes u64::MAX
        Some(raw as u64)
    }

    pub fn multiplier_at(&self, level: u32) -> f64 {
        self.effect_per_level * level.min(self.max_level) as f64
    }
}

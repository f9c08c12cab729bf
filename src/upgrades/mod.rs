//! Upgrades
//!
//! Faction-scoped upgrades that feed the modifier registries and the economy.
//!
//! ## Module Structure
//! - `effect`: the upgrade record and its apply strategy
//! - `catalog`: RON loading, validation warnings and upgrade offers

pub mod catalog;
pub mod effect;

pub use catalog::{UpgradeCatalog, UpgradeIssue, UpgradesConfig, DEFAULT_UPGRADES_PATH};
pub use effect::{
    skewed_gold, GoldRange, UpgradeContext, UpgradeEffect, UpgradeId, UpgradeKind, UpgradeOutcome,
    ValueKind,
};

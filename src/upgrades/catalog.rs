//! Upgrade Catalog
//!
//! Upgrades loaded from `assets/config/upgrades.ron`. Loading rejects duplicate
//! ids and unknown prerequisites. Malformed targets are reported as
//! [`UpgradeIssue`] warnings but kept: applying such an upgrade is a recorded
//! no-op, which later prerequisites may still depend on.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::effect::{UpgradeEffect, UpgradeId, UpgradeKind};
use crate::abilities::AbilityCatalog;
use crate::error::ConfigError;
use crate::modifiers::FactionModifierRegistry;
use crate::rng::GameRng;

pub const DEFAULT_UPGRADES_PATH: &str = "assets/config/upgrades.ron";

/// Root structure of the upgrades RON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpgradesConfig {
    pub upgrades: Vec<UpgradeEffect>,
}

/// A non-fatal problem with one upgrade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeIssue {
    pub upgrade: UpgradeId,
    pub problem: String,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct UpgradeCatalog {
    /// Upgrades in file order
    upgrades: Vec<UpgradeEffect>,
    index: BTreeMap<UpgradeId, usize>,
}

impl UpgradeCatalog {
    pub fn new(config: UpgradesConfig) -> Result<Self, ConfigError> {
        let mut index = BTreeMap::new();
        for (position, upgrade) in config.upgrades.iter().enumerate() {
            if index.insert(upgrade.id.clone(), position).is_some() {
                return Err(ConfigError::DuplicateUpgrade(upgrade.id.0.clone()));
            }
        }
        for upgrade in &config.upgrades {
            if let Some(missing) = upgrade
                .prerequisites
                .iter()
                .find(|prerequisite| !index.contains_key(*prerequisite))
            {
                return Err(ConfigError::UnknownPrerequisite {
                    upgrade: upgrade.id.0.clone(),
                    missing: missing.0.clone(),
                });
            }
        }
        Ok(Self {
            upgrades: config.upgrades,
            index,
        })
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: UpgradesConfig =
            ron::from_str(contents).map_err(|e| ConfigError::parse("upgrades", e))?;
        Self::new(config)
    }

    /// Load and validate, logging every issue as a warning.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let catalog = Self::from_ron_str(&contents)?;
        for issue in catalog.validate(None) {
            warn!("Upgrade `{}` will have no effect: {}", issue.upgrade, issue.problem);
        }
        info!("Loaded {} upgrades from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_file(Path::new(DEFAULT_UPGRADES_PATH))
    }

    /// Collect non-fatal issues. With an ability catalog, unknown ability targets
    /// are reported too.
    pub fn validate(&self, abilities: Option<&AbilityCatalog>) -> Vec<UpgradeIssue> {
        let mut issues = Vec::new();
        for upgrade in &self.upgrades {
            for problem in upgrade.issues() {
                issues.push(UpgradeIssue {
                    upgrade: upgrade.id.clone(),
                    problem,
                });
            }
            if let (Some(abilities), Some(target)) = (abilities, &upgrade.target_ability) {
                if !abilities.contains(target) {
                    issues.push(UpgradeIssue {
                        upgrade: upgrade.id.clone(),
                        problem: format!("unknown target_ability `{}`", target),
                    });
                }
            }
        }
        issues
    }

    pub fn get(&self, id: &UpgradeId) -> Option<&UpgradeEffect> {
        self.index.get(id).map(|position| &self.upgrades[*position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeEffect> {
        self.upgrades.iter()
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Whether an upgrade may be offered to a faction: prerequisites met, and
    /// feature upgrades not already applied.
    pub fn is_eligible(&self, upgrade: &UpgradeEffect, registry: &FactionModifierRegistry) -> bool {
        if !registry.has_all_prerequisites(&upgrade.prerequisites) {
            return false;
        }
        !(upgrade.kind == UpgradeKind::Feature && registry.is_applied(&upgrade.id))
    }

    /// Draw up to `count` distinct eligible upgrades.
    pub fn offer(
        &self,
        registry: &FactionModifierRegistry,
        count: usize,
        rng: &mut GameRng,
    ) -> Vec<&UpgradeEffect> {
        let mut eligible: Vec<&UpgradeEffect> = self
            .upgrades
            .iter()
            .filter(|upgrade| self.is_eligible(upgrade, registry))
            .collect();
        rng.shuffle(&mut eligible);
        eligible.truncate(count);
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = r#"(
        upgrades: [
            (
                id: "sharpen",
                name: "Sharpen",
                kind: ActorAttribute,
                value_kind: Multiplicative,
                value: 0.1,
                target_actor_type: Some(Knight),
                target_attribute: Some(Damage),
            ),
            (
                id: "hone",
                name: "Hone",
                kind: ActorAttribute,
                value_kind: Multiplicative,
                value: 0.1,
                target_actor_type: Some(Knight),
                target_attribute: Some(Damage),
                prerequisites: ["sharpen"],
            ),
            (
                id: "piercing",
                name: "Piercing Arrows",
                kind: Feature,
                value_kind: Boolean,
                enabled: true,
                target_actor_type: Some(Archer),
                target_feature: Some(Piercing),
            ),
        ],
    )"#;

    #[test]
    fn test_unknown_prerequisite_rejected() {
        let ron = r#"(upgrades: [(id: "a", name: "A", kind: InstantGold, value: 5.0, prerequisites: ["ghost"])])"#;
        assert!(matches!(
            UpgradeCatalog::from_ron_str(ron),
            Err(ConfigError::UnknownPrerequisite { .. })
        ));
    }

    #[test]
    fn test_offer_respects_eligibility() {
        let catalog = UpgradeCatalog::from_ron_str(CHAIN).unwrap();
        let mut registry = FactionModifierRegistry::new();
        let mut rng = GameRng::from_seed(3);

        let offered: Vec<&str> = catalog
            .offer(&registry, 10, &mut rng)
            .into_iter()
            .map(|upgrade| upgrade.id.as_str())
            .collect();
        assert_eq!(offered.len(), 2);
        assert!(!offered.contains(&"hone"));

        registry.mark_applied(UpgradeId::new("sharpen"));
        registry.mark_applied(UpgradeId::new("piercing"));
        let offered = catalog.offer(&registry, 10, &mut rng);
        assert_eq!(offered.len(), 2);
        assert!(offered.iter().all(|upgrade| upgrade.id.as_str() != "piercing"));
    }

    #[test]
    fn test_offer_truncates() {
        let catalog = UpgradeCatalog::from_ron_str(CHAIN).unwrap();
        let registry = FactionModifierRegistry::new();
        let mut rng = GameRng::from_seed(9);
        assert_eq!(catalog.offer(&registry, 1, &mut rng).len(), 1);
    }
}

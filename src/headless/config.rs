//! JSON configuration parsing for headless mode
//!
//! Parses JSON scenario files and checks them against the loaded catalogs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityCatalog, AbilityId};
use crate::actors::{ActorType, Faction};
use crate::error::ConfigError;
use crate::upgrades::{UpgradeCatalog, UpgradeId};

/// One actor placed at scenario start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioActor {
    pub faction: Faction,
    pub actor_type: ActorType,
    /// Ground-plane position `[x, z]`
    pub position: [f32; 2],
    /// Ability ids, one per slot
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

/// An upgrade applied to a faction at a fixed session time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedUpgrade {
    pub at_secs: f32,
    pub faction: Faction,
    pub upgrade: UpgradeId,
}

/// Headless scenario configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessScenarioConfig {
    /// Scenario name for reports
    #[serde(default = "default_name")]
    pub name: String,
    pub actors: Vec<ScenarioActor>,
    #[serde(default)]
    pub upgrades: Vec<TimedUpgrade>,
    /// Gold each faction starts with
    #[serde(default)]
    pub starting_gold: u32,
    /// Maximum session duration in seconds (default: 180)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic scenario reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the JSON report (optional)
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Ability catalog override (default: assets/config/abilities.ron)
    #[serde(default)]
    pub abilities_path: Option<PathBuf>,
    /// Upgrade catalog override (default: assets/config/upgrades.ron)
    #[serde(default)]
    pub upgrades_path: Option<PathBuf>,
}

fn default_name() -> String {
    "Unnamed Scenario".to_string()
}

fn default_max_duration() -> f32 {
    180.0
}

impl HeadlessScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: HeadlessScenarioConfig =
            serde_json::from_str(contents).map_err(|e| ConfigError::parse("scenario", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors.is_empty() {
            return Err(ConfigError::Scenario("scenario has no actors".to_string()));
        }
        let factions: BTreeSet<Faction> = self.actors.iter().map(|actor| actor.faction).collect();
        if factions.len() < 2 {
            return Err(ConfigError::Scenario(
                "both factions need at least one actor".to_string(),
            ));
        }
        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err(ConfigError::Scenario(format!(
                "max_duration_secs must be positive, got {}",
                self.max_duration_secs
            )));
        }
        for timed in &self.upgrades {
            if !timed.at_secs.is_finite() || timed.at_secs < 0.0 {
                return Err(ConfigError::Scenario(format!(
                    "upgrade `{}` has invalid time {}",
                    timed.upgrade, timed.at_secs
                )));
            }
        }
        Ok(())
    }

    /// Check every referenced ability and upgrade exists.
    pub fn validate_against(
        &self,
        abilities: &AbilityCatalog,
        upgrades: &UpgradeCatalog,
    ) -> Result<(), ConfigError> {
        for actor in &self.actors {
            abilities.resolve_slots(&actor.abilities)?;
        }
        for timed in &self.upgrades {
            if upgrades.get(&timed.upgrade).is_none() {
                return Err(ConfigError::UnknownUpgrade(timed.upgrade.0.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_scenario() {
        let json = r#"{
            "actors": [
                { "faction": "Player", "actor_type": "Knight", "position": [0.0, -5.0] },
                { "faction": "Enemy", "actor_type": "Minion", "position": [0.0, 5.0] }
            ]
        }"#;
        let config = HeadlessScenarioConfig::from_json_str(json).unwrap();
        assert_eq!(config.max_duration_secs, 180.0);
        assert!(config.random_seed.is_none());
        assert!(config.actors[0].abilities.is_empty());
    }

    #[test]
    fn test_one_sided_scenario_rejected() {
        let json = r#"{
            "actors": [
                { "faction": "Player", "actor_type": "Knight", "position": [0.0, 0.0] }
            ]
        }"#;
        assert!(matches!(
            HeadlessScenarioConfig::from_json_str(json),
            Err(ConfigError::Scenario(_))
        ));
    }
}

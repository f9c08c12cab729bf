//! Data-Driven Ability Catalog
//!
//! Ability definitions are loaded from `assets/config/abilities.ron` rather than
//! hardcoded, so balance changes don't require recompilation.
//!
//! ## Usage
//! ```ignore
//! let catalog = AbilityCatalog::load_default()?;
//! let fireball = catalog.get(&AbilityId::new("fireball")).unwrap();
//! println!("Fireball cooldown: {}", fireball.cooldown);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::definition::{AbilityDefinition, AbilityId};
use crate::error::ConfigError;

pub const DEFAULT_ABILITIES_PATH: &str = "assets/config/abilities.ron";

/// Root structure of the abilities RON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilitiesConfig {
    pub abilities: Vec<AbilityDefinition>,
}

/// Validated, shared ability definitions keyed by id.
#[derive(Resource, Clone, Debug, Default)]
pub struct AbilityCatalog {
    definitions: BTreeMap<AbilityId, Arc<AbilityDefinition>>,
}

impl AbilityCatalog {
    /// Build a catalog, rejecting duplicate ids and invalid numbers.
    pub fn new(config: AbilitiesConfig) -> Result<Self, ConfigError> {
        let mut definitions = BTreeMap::new();
        for definition in config.abilities {
            validate_definition(&definition)?;
            let id = definition.id.clone();
            if definitions.insert(id.clone(), Arc::new(definition)).is_some() {
                return Err(ConfigError::DuplicateAbility(id.0));
            }
        }
        Ok(Self { definitions })
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AbilitiesConfig =
            ron::from_str(contents).map_err(|e| ConfigError::parse("abilities", e))?;
        Self::new(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let catalog = Self::from_ron_str(&contents)?;
        info!(
            "Loaded {} ability definitions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load ability definitions from assets/config/abilities.ron
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_file(Path::new(DEFAULT_ABILITIES_PATH))
    }

    pub fn get(&self, id: &AbilityId) -> Option<&Arc<AbilityDefinition>> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &AbilityId) -> bool {
        self.definitions.contains_key(id)
    }

    /// Resolve a list of ids into ability slots.
    pub fn resolve_slots(&self, ids: &[AbilityId]) -> Result<Vec<Arc<AbilityDefinition>>, ConfigError> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownAbility(id.0.clone()))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AbilityDefinition>> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn validate_definition(definition: &AbilityDefinition) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidAbility {
        id: definition.id.0.clone(),
        reason,
    };

    if definition.id.as_str().is_empty() {
        return Err(invalid("id must not be empty".to_string()));
    }

    let fields = [
        ("magnitude", definition.magnitude),
        ("interval", definition.interval),
        ("stun_duration", definition.stun_duration),
        ("damage_interval", definition.damage_interval),
        ("cooldown", definition.cooldown),
        ("casting_time", definition.casting_time),
        ("range", definition.range),
        ("speed", definition.speed),
        ("duration", definition.duration),
        ("area_radius", definition.area_radius),
        ("area_width", definition.area_width),
        ("area_length", definition.area_length),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(format!("{} must be a non-negative number, got {}", name, value)));
        }
    }

    if definition.behavior.is_travelling() && definition.speed <= 0.0 {
        return Err(invalid(format!(
            "{} abilities need a positive speed",
            definition.behavior.name()
        )));
    }
    Ok(())
}

//! Faction Modifier Registry
//!
//! One registry per faction, shared by every actor of that faction for the whole
//! session. Lookups never fail: an absent key reads as the zero-effect default
//! (additive 0, multiplier 1, flag false).
//!
//! Maps are ordered so that reset notifications and debug dumps are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{PerAbilityModifiers, PerTypeModifiers};
use crate::abilities::AbilityId;
use crate::actors::{ActorType, Faction};
use crate::upgrades::UpgradeId;

/// Boolean capabilities unlocked per actor type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureId {
    /// Melee heroes chain their full attack combo. Presentation-only: the host
    /// reads it from feature-change events to pick animations.
    FullCombo,
    /// Melee heroes can raise a block. Presentation-only, like `FullCombo`.
    Block,
    /// Arrows keep flying after the first hit
    Piercing,
}

impl FeatureId {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureId::FullCombo => "Full Combo",
            FeatureId::Block => "Block",
            FeatureId::Piercing => "Piercing",
        }
    }
}

/// A boolean feature that changed value, queued for presentation resync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureChange {
    pub actor_type: ActorType,
    pub feature: FeatureId,
    pub enabled: bool,
}

/// Per-faction store of upgrade accumulators.
#[derive(Clone, Debug, Default)]
pub struct FactionModifierRegistry {
    ability_modifiers: BTreeMap<AbilityId, PerAbilityModifiers>,
    actor_type_modifiers: BTreeMap<ActorType, PerTypeModifiers>,
    features: BTreeMap<(ActorType, FeatureId), bool>,
    applied_upgrades: BTreeSet<UpgradeId>,
    pending_feature_changes: Vec<FeatureChange>,
}

impl FactionModifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the accumulators for an ability. Untouched abilities read as identity.
    pub fn ability_modifiers(&self, ability: &AbilityId) -> PerAbilityModifiers {
        self.ability_modifiers
            .get(ability)
            .copied()
            .unwrap_or_default()
    }

    /// Mutable accumulators for an ability, registering a zero-effect entry on first access.
    pub fn ability_modifiers_mut(&mut self, ability: &AbilityId) -> &mut PerAbilityModifiers {
        self.ability_modifiers.entry(ability.clone()).or_default()
    }

    /// Read the accumulators for an actor type. `ActorType::None` always reads as identity.
    pub fn actor_type_modifiers(&self, actor_type: ActorType) -> PerTypeModifiers {
        if actor_type == ActorType::None {
            return PerTypeModifiers::default();
        }
        self.actor_type_modifiers
            .get(&actor_type)
            .copied()
            .unwrap_or_default()
    }

    /// Mutable accumulators for an actor type, registering on first access.
    ///
    /// Returns `None` for `ActorType::None`, which is never registered.
    pub fn actor_type_modifiers_mut(&mut self, actor_type: ActorType) -> Option<&mut PerTypeModifiers> {
        if actor_type == ActorType::None {
            return None;
        }
        Some(self.actor_type_modifiers.entry(actor_type).or_default())
    }

    pub fn feature(&self, actor_type: ActorType, feature: FeatureId) -> bool {
        self.features
            .get(&(actor_type, feature))
            .copied()
            .unwrap_or(false)
    }

    /// Set a feature flag. A change notification is queued only when the value flips.
    pub fn set_feature(&mut self, actor_type: ActorType, feature: FeatureId, enabled: bool) {
        let previous = self.features.insert((actor_type, feature), enabled).unwrap_or(false);
        if previous != enabled {
            self.pending_feature_changes.push(FeatureChange {
                actor_type,
                feature,
                enabled,
            });
        }
    }

    /// True when every listed upgrade has been applied (vacuously true for an empty list).
    pub fn has_all_prerequisites(&self, prerequisites: &[UpgradeId]) -> bool {
        prerequisites
            .iter()
            .all(|id| self.applied_upgrades.contains(id))
    }

    pub fn mark_applied(&mut self, upgrade: UpgradeId) {
        self.applied_upgrades.insert(upgrade);
    }

    pub fn is_applied(&self, upgrade: &UpgradeId) -> bool {
        self.applied_upgrades.contains(upgrade)
    }

    pub fn applied_upgrades(&self) -> impl Iterator<Item = &UpgradeId> {
        self.applied_upgrades.iter()
    }

    /// Clear every map back to defaults.
    ///
    /// Every feature that was enabled queues a `enabled: false` change so dependent
    /// presentation state can resynchronize.
    pub fn reset(&mut self) {
        for (&(actor_type, feature), &enabled) in &self.features {
            if enabled {
                self.pending_feature_changes.push(FeatureChange {
                    actor_type,
                    feature,
                    enabled: false,
                });
            }
        }
        self.ability_modifiers.clear();
        self.actor_type_modifiers.clear();
        self.features.clear();
        self.applied_upgrades.clear();
        debug!("Modifier registry reset");
    }

    /// Take all queued feature changes in the order they happened.
    pub fn drain_feature_changes(&mut self) -> Vec<FeatureChange> {
        std::mem::take(&mut self.pending_feature_changes)
    }

    /// Actor types that currently carry registered accumulators.
    pub fn registered_actor_types(&self) -> impl Iterator<Item = ActorType> + '_ {
        self.actor_type_modifiers.keys().copied()
    }
}

/// The faction registries owned by a session.
#[derive(Clone, Debug, Default)]
pub struct FactionRegistries {
    registries: BTreeMap<Faction, FactionModifierRegistry>,
}

impl FactionRegistries {
    /// Registries for the given factions, all starting empty.
    pub fn with_factions(factions: &[Faction]) -> Self {
        Self {
            registries: factions
                .iter()
                .map(|faction| (*faction, FactionModifierRegistry::new()))
                .collect(),
        }
    }

    pub fn get(&self, faction: Faction) -> Option<&FactionModifierRegistry> {
        self.registries.get(&faction)
    }

    pub fn get_mut(&mut self, faction: Faction) -> Option<&mut FactionModifierRegistry> {
        self.registries.get_mut(&faction)
    }

    /// Registry for a faction, registering an empty one if the faction is new.
    pub fn ensure(&mut self, faction: Faction) -> &mut FactionModifierRegistry {
        self.registries.entry(faction).or_default()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Faction, &mut FactionModifierRegistry)> {
        self.registries.iter_mut().map(|(faction, registry)| (*faction, registry))
    }

    pub fn reset_all(&mut self) {
        for registry in self.registries.values_mut() {
            registry.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_change_only_on_flip() {
        let mut registry = FactionModifierRegistry::new();
        registry.set_feature(ActorType::Archer, FeatureId::Piercing, true);
        registry.set_feature(ActorType::Archer, FeatureId::Piercing, true);
        registry.set_feature(ActorType::Archer, FeatureId::Block, false);

        let changes = registry.drain_feature_changes();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].enabled);
        assert!(registry.drain_feature_changes().is_empty());
    }

    #[test]
    fn test_none_actor_type_is_never_registered() {
        let mut registry = FactionModifierRegistry::new();
        assert!(registry.actor_type_modifiers_mut(ActorType::None).is_none());
        assert_eq!(registry.registered_actor_types().count(), 0);
        assert_eq!(
            registry.actor_type_modifiers(ActorType::None),
            PerTypeModifiers::default()
        );
    }

    #[test]
    fn test_ensure_registers_new_faction() {
        let mut registries = FactionRegistries::default();
        assert!(registries.get(Faction::Enemy).is_none());
        registries.ensure(Faction::Enemy);
        assert!(registries.get(Faction::Enemy).is_some());
    }
}

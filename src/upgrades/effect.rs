//! Upgrade Effects
//!
//! One record type covers every upgrade; `kind` selects what `apply` does.
//!
//! ## Apply order
//! 1. Unmet prerequisites: nothing happens and nothing is recorded.
//! 2. Dispatch on `kind` and mutate the registry, economy or structures.
//! 3. Record the id as applied, whether or not step 2 changed anything.
//! 4. Push recalculated stats to living actors of a changed actor type.
//!
//! Step 4 runs only after the registry mutation is complete, so actors never
//! observe a half-applied upgrade.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::actors::{ActorId, ActorType, Faction, Roster};
use crate::constants::{SACRIFICE_HEALTH_FRACTION, SACRIFICE_INCOME_BOOST};
use crate::economy::EconomySink;
use crate::modifiers::{AbilityAttribute, ActorAttribute, FactionModifierRegistry, FeatureId, Modifier};
use crate::rng::GameRng;

/// Stable identity of an upgrade.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeId(pub String);

impl UpgradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Modify one attribute channel of an actor type
    ActorAttribute,
    /// Modify one attribute channel of an ability
    AbilityAttribute,
    /// Toggle a boolean feature for an actor type
    Feature,
    /// Grant a fixed amount of gold
    InstantGold,
    /// Grant gold drawn from a range, skewed toward the minimum
    RandomGold,
    /// Trade half of a structure's health for gold and income
    Sacrifice,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    #[default]
    Additive,
    Multiplicative,
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRange {
    pub min: u32,
    pub max: u32,
}

/// Upgrade configuration loaded from RON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeEffect {
    pub id: UpgradeId,
    /// Display name
    pub name: String,
    pub kind: UpgradeKind,
    #[serde(default)]
    pub value_kind: ValueKind,
    /// Additive amount, multiplicative delta (0.1 = +10%) or gold
    #[serde(default)]
    pub value: f32,
    /// Target value of a feature upgrade
    #[serde(default)]
    pub enabled: bool,

    // === Targets ===
    #[serde(default)]
    pub target_actor_type: Option<ActorType>,
    #[serde(default)]
    pub target_attribute: Option<ActorAttribute>,
    #[serde(default)]
    pub target_ability: Option<AbilityId>,
    #[serde(default)]
    pub target_ability_attribute: Option<AbilityAttribute>,
    #[serde(default)]
    pub target_feature: Option<FeatureId>,

    /// Upgrades that must already be applied to this faction
    #[serde(default)]
    pub prerequisites: Vec<UpgradeId>,
    #[serde(default)]
    pub gold_range: Option<GoldRange>,
}

/// What applying an upgrade did.
#[derive(Clone, Debug, PartialEq)]
pub enum UpgradeOutcome {
    /// Prerequisites unmet; nothing changed and nothing was recorded
    Skipped,
    /// Malformed targets; nothing changed but the id was recorded
    Inert,
    ActorTypeChanged {
        actor_type: ActorType,
        attribute: ActorAttribute,
        recalculated: usize,
    },
    AbilityChanged {
        ability: AbilityId,
        attribute: AbilityAttribute,
    },
    FeatureChanged {
        actor_type: ActorType,
        feature: FeatureId,
        enabled: bool,
    },
    GoldGranted {
        amount: u32,
    },
    Sacrificed {
        structure: ActorId,
        health_lost: f32,
        gold: u32,
    },
}

impl UpgradeOutcome {
    /// True when the id was recorded as applied.
    pub fn was_recorded(&self) -> bool {
        !matches!(self, UpgradeOutcome::Skipped)
    }
}

/// Everything an upgrade may mutate for one faction.
pub struct UpgradeContext<'a> {
    pub faction: Faction,
    pub registry: &'a mut FactionModifierRegistry,
    pub roster: &'a mut Roster,
    pub economy: &'a mut dyn EconomySink,
    pub rng: &'a mut GameRng,
}

/// Gold for a randomized reward: `min + (max - min) * u^3`, rounded.
///
/// Cubing the uniform sample skews rewards toward the minimum.
pub fn skewed_gold(range: GoldRange, sample: f32) -> u32 {
    let low = range.min.min(range.max) as f32;
    let high = range.max.max(range.min) as f32;
    let u = sample.clamp(0.0, 1.0);
    (low + (high - low) * u * u * u).round() as u32
}

fn apply_value(modifier: &mut Modifier, value_kind: ValueKind, value: f32) -> bool {
    match value_kind {
        ValueKind::Additive => modifier.apply_additive(value),
        ValueKind::Multiplicative => modifier.apply_multiplicative(value),
        ValueKind::Boolean => return false,
    }
    true
}

impl UpgradeEffect {
    pub fn apply(&self, ctx: &mut UpgradeContext) -> UpgradeOutcome {
        if !ctx.registry.has_all_prerequisites(&self.prerequisites) {
            debug!("{} skipped: prerequisites not met", self.id);
            return UpgradeOutcome::Skipped;
        }

        let outcome = self.dispatch(ctx);
        ctx.registry.mark_applied(self.id.clone());

        // Registry mutation is complete; now push stats to living actors
        if let UpgradeOutcome::ActorTypeChanged {
            actor_type,
            attribute,
            ..
        } = outcome
        {
            let modifiers = ctx.registry.actor_type_modifiers(actor_type);
            let recalculated = ctx.roster.recalculate_type(ctx.faction, actor_type, &modifiers);
            return UpgradeOutcome::ActorTypeChanged {
                actor_type,
                attribute,
                recalculated,
            };
        }
        outcome
    }

    fn dispatch(&self, ctx: &mut UpgradeContext) -> UpgradeOutcome {
        match self.kind {
            UpgradeKind::ActorAttribute => {
                let (Some(actor_type), Some(attribute)) = (self.target_actor_type, self.target_attribute) else {
                    return UpgradeOutcome::Inert;
                };
                let Some(modifiers) = ctx.registry.actor_type_modifiers_mut(actor_type) else {
                    return UpgradeOutcome::Inert;
                };
                if !apply_value(modifiers.get_mut(attribute), self.value_kind, self.value) {
                    return UpgradeOutcome::Inert;
                }
                UpgradeOutcome::ActorTypeChanged {
                    actor_type,
                    attribute,
                    recalculated: 0,
                }
            }
            UpgradeKind::AbilityAttribute => {
                let (Some(ability), Some(attribute)) = (&self.target_ability, self.target_ability_attribute) else {
                    return UpgradeOutcome::Inert;
                };
                if self.value_kind == ValueKind::Boolean {
                    return UpgradeOutcome::Inert;
                }
                let modifiers = ctx.registry.ability_modifiers_mut(ability);
                apply_value(modifiers.get_mut(attribute), self.value_kind, self.value);
                UpgradeOutcome::AbilityChanged {
                    ability: ability.clone(),
                    attribute,
                }
            }
            UpgradeKind::Feature => {
                let (Some(actor_type), Some(feature)) = (self.target_actor_type, self.target_feature) else {
                    return UpgradeOutcome::Inert;
                };
                if actor_type == ActorType::None {
                    return UpgradeOutcome::Inert;
                }
                ctx.registry.set_feature(actor_type, feature, self.enabled);
                UpgradeOutcome::FeatureChanged {
                    actor_type,
                    feature,
                    enabled: self.enabled,
                }
            }
            UpgradeKind::InstantGold => {
                if !self.value.is_finite() || self.value < 0.0 {
                    return UpgradeOutcome::Inert;
                }
                let amount = self.value.round() as u32;
                ctx.economy.add_gold(ctx.faction, amount);
                UpgradeOutcome::GoldGranted { amount }
            }
            UpgradeKind::RandomGold => {
                let Some(range) = self.gold_range else {
                    return UpgradeOutcome::Inert;
                };
                let amount = skewed_gold(range, ctx.rng.random_f32());
                ctx.economy.add_gold(ctx.faction, amount);
                UpgradeOutcome::GoldGranted { amount }
            }
            UpgradeKind::Sacrifice => self.sacrifice(ctx),
        }
    }

    fn sacrifice(&self, ctx: &mut UpgradeContext) -> UpgradeOutcome {
        let faction = ctx.faction;
        // Castle first, otherwise the lowest-id living structure
        let structure = ctx
            .roster
            .alive_of_type(faction, ActorType::Castle)
            .map(|actor| actor.id)
            .next()
            .or_else(|| {
                ctx.roster
                    .iter()
                    .find(|actor| {
                        actor.faction == faction && actor.actor_type.is_structure() && !actor.is_dead()
                    })
                    .map(|actor| actor.id)
            });
        let Some(structure) = structure else {
            return UpgradeOutcome::Inert;
        };
        let Some(actor) = ctx.roster.get_mut(structure) else {
            return UpgradeOutcome::Inert;
        };

        let health_lost = actor.apply_damage(actor.current_health * SACRIFICE_HEALTH_FRACTION);
        let gold = self.value.max(0.0).round() as u32;
        ctx.economy.add_gold(faction, gold);
        ctx.economy.boost_income(faction, SACRIFICE_INCOME_BOOST);
        UpgradeOutcome::Sacrificed {
            structure,
            health_lost,
            gold,
        }
    }

    /// Problems that make this upgrade a no-op when applied.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        match self.kind {
            UpgradeKind::ActorAttribute => {
                match self.target_actor_type {
                    None => issues.push("missing target_actor_type".to_string()),
                    Some(ActorType::None) => issues.push("target_actor_type is None".to_string()),
                    Some(_) => {}
                }
                if self.target_attribute.is_none() {
                    issues.push("missing target_attribute".to_string());
                }
                if self.value_kind == ValueKind::Boolean {
                    issues.push("numeric upgrade with a Boolean value_kind".to_string());
                }
            }
            UpgradeKind::AbilityAttribute => {
                if self.target_ability.is_none() {
                    issues.push("missing target_ability".to_string());
                }
                if self.target_ability_attribute.is_none() {
                    issues.push("missing target_ability_attribute".to_string());
                }
                if self.value_kind == ValueKind::Boolean {
                    issues.push("numeric upgrade with a Boolean value_kind".to_string());
                }
            }
            UpgradeKind::Feature => {
                match self.target_actor_type {
                    None => issues.push("missing target_actor_type".to_string()),
                    Some(ActorType::None) => issues.push("target_actor_type is None".to_string()),
                    Some(_) => {}
                }
                if self.target_feature.is_none() {
                    issues.push("missing target_feature".to_string());
                }
            }
            UpgradeKind::InstantGold => {
                if !self.value.is_finite() || self.value < 0.0 {
                    issues.push(format!("gold value must be non-negative, got {}", self.value));
                }
            }
            UpgradeKind::RandomGold => match self.gold_range {
                None => issues.push("missing gold_range".to_string()),
                Some(range) if range.min > range.max => {
                    issues.push(format!("gold_range min {} exceeds max {}", range.min, range.max))
                }
                Some(_) => {}
            },
            UpgradeKind::Sacrifice => {}
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skewed_gold_bounds() {
        let range = GoldRange { min: 10, max: 110 };
        assert_eq!(skewed_gold(range, 0.0), 10);
        assert_eq!(skewed_gold(range, 1.0), 110);
        // 0.5^3 = 0.125 of the spread
        assert_eq!(skewed_gold(range, 0.5), 23);
    }

    #[test]
    fn test_issues_flag_missing_targets() {
        let upgrade = UpgradeEffect {
            id: UpgradeId::new("broken"),
            name: "Broken".to_string(),
            kind: UpgradeKind::AbilityAttribute,
            value_kind: ValueKind::Multiplicative,
            value: 0.1,
            enabled: false,
            target_actor_type: None,
            target_attribute: None,
            target_ability: None,
            target_ability_attribute: Some(AbilityAttribute::Damage),
            target_feature: None,
            prerequisites: vec![],
            gold_range: None,
        };
        assert_eq!(upgrade.issues(), vec!["missing target_ability".to_string()]);
    }
}

//! Modifier System
//!
//! Composition algebra for upgrade influence on abilities and actor types.
//!
//! ## Module Structure
//! - `accumulator`: the [`Modifier`] value type and its stacking law
//! - `registry`: per-faction store of accumulators, feature flags and applied upgrades
//!
//! The channel groups below ([`PerAbilityModifiers`], [`PerTypeModifiers`]) hold one
//! independent [`Modifier`] per attribute, so stacking on one channel never leaks
//! into another.

pub mod accumulator;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use accumulator::Modifier;
pub use registry::{FactionModifierRegistry, FactionRegistries, FeatureChange, FeatureId};

/// Attribute channels tracked per ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityAttribute {
    Damage,
    Heal,
    Cooldown,
    Range,
    AreaSize,
    StunDuration,
}

impl AbilityAttribute {
    pub fn all() -> &'static [AbilityAttribute] {
        &[
            AbilityAttribute::Damage,
            AbilityAttribute::Heal,
            AbilityAttribute::Cooldown,
            AbilityAttribute::Range,
            AbilityAttribute::AreaSize,
            AbilityAttribute::StunDuration,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AbilityAttribute::Damage => "damage",
            AbilityAttribute::Heal => "heal",
            AbilityAttribute::Cooldown => "cooldown",
            AbilityAttribute::Range => "range",
            AbilityAttribute::AreaSize => "area size",
            AbilityAttribute::StunDuration => "stun duration",
        }
    }
}

/// Attribute channels tracked per actor type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorAttribute {
    Health,
    Damage,
    MoveSpeed,
    Defense,
    DetectionRange,
}

impl ActorAttribute {
    pub fn all() -> &'static [ActorAttribute] {
        &[
            ActorAttribute::Health,
            ActorAttribute::Damage,
            ActorAttribute::MoveSpeed,
            ActorAttribute::Defense,
            ActorAttribute::DetectionRange,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActorAttribute::Health => "health",
            ActorAttribute::Damage => "damage",
            ActorAttribute::MoveSpeed => "move speed",
            ActorAttribute::Defense => "defense",
            ActorAttribute::DetectionRange => "detection range",
        }
    }
}

/// Independent accumulators for every ability attribute channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerAbilityModifiers {
    pub damage: Modifier,
    pub heal: Modifier,
    pub cooldown: Modifier,
    pub range: Modifier,
    pub area_size: Modifier,
    pub stun_duration: Modifier,
}

impl PerAbilityModifiers {
    pub fn get(&self, attribute: AbilityAttribute) -> Modifier {
        match attribute {
            AbilityAttribute::Damage => self.damage,
            AbilityAttribute::Heal => self.heal,
            AbilityAttribute::Cooldown => self.cooldown,
            AbilityAttribute::Range => self.range,
            AbilityAttribute::AreaSize => self.area_size,
            AbilityAttribute::StunDuration => self.stun_duration,
        }
    }

    pub fn get_mut(&mut self, attribute: AbilityAttribute) -> &mut Modifier {
        match attribute {
            AbilityAttribute::Damage => &mut self.damage,
            AbilityAttribute::Heal => &mut self.heal,
            AbilityAttribute::Cooldown => &mut self.cooldown,
            AbilityAttribute::Range => &mut self.range,
            AbilityAttribute::AreaSize => &mut self.area_size,
            AbilityAttribute::StunDuration => &mut self.stun_duration,
        }
    }
}

/// Independent accumulators for every actor-type attribute channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerTypeModifiers {
    pub health: Modifier,
    pub damage: Modifier,
    pub move_speed: Modifier,
    pub defense: Modifier,
    pub detection_range: Modifier,
}

impl PerTypeModifiers {
    pub fn get(&self, attribute: ActorAttribute) -> Modifier {
        match attribute {
            ActorAttribute::Health => self.health,
            ActorAttribute::Damage => self.damage,
            ActorAttribute::MoveSpeed => self.move_speed,
            ActorAttribute::Defense => self.defense,
            ActorAttribute::DetectionRange => self.detection_range,
        }
    }

    pub fn get_mut(&mut self, attribute: ActorAttribute) -> &mut Modifier {
        match attribute {
            ActorAttribute::Health => &mut self.health,
            ActorAttribute::Damage => &mut self.damage,
            ActorAttribute::MoveSpeed => &mut self.move_speed,
            ActorAttribute::Defense => &mut self.defense,
            ActorAttribute::DetectionRange => &mut self.detection_range,
        }
    }
}

//! Ability Definitions
//!
//! Immutable static configuration of one ability plus the derived-value pipeline
//! that folds faction modifiers into its numbers.
//!
//! ## Pipeline
//! ```text
//! stage1 = (base + ability.additive) * ability.multiplier
//! final  = stage1 * actor_type.multiplier        // damage and heal magnitudes
//! ```
//! Cooldown skips the additive term and chains two multipliers instead:
//! `base * ability_cooldown.multiplier * caster_global_multiplier`.
//! Stun duration, range and area size stop after stage 1.
//!
//! A missing registry reads as identity everywhere, so every getter degrades to
//! the unmodified base.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::actors::ActorType;
use crate::constants::DEFAULT_DAMAGE_INTERVAL;
use crate::modifiers::{FactionModifierRegistry, PerAbilityModifiers, PerTypeModifiers};

/// Stable identity of an ability definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(pub String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How an ability instance moves and lives after it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// Flies forward, stops at the first hit or at max range
    Projectile,
    /// Flies forward; pierces through targets once the caster type unlocks Piercing
    Arrow,
    /// Lingers at the placement point and strikes every tick
    AreaEffect,
    /// Area that tracks the caster
    Follow,
    /// Arms for `duration` seconds, then strikes once
    DelayedDamageArea,
    /// Compound: follows the caster while an area drives the timing
    DebuffArea,
    /// Moves the caster forward, striking what is in front
    Charge,
}

impl BehaviorKind {
    pub fn name(&self) -> &'static str {
        match self {
            BehaviorKind::Projectile => "Projectile",
            BehaviorKind::Arrow => "Arrow",
            BehaviorKind::AreaEffect => "Area",
            BehaviorKind::Follow => "Follow",
            BehaviorKind::DelayedDamageArea => "Delayed Area",
            BehaviorKind::DebuffArea => "Debuff Area",
            BehaviorKind::Charge => "Charge",
        }
    }

    /// Behaviors that need a positive `speed` to go anywhere.
    pub fn is_travelling(&self) -> bool {
        matches!(
            self,
            BehaviorKind::Projectile | BehaviorKind::Arrow | BehaviorKind::Charge
        )
    }
}

/// What an ability does to the targets it reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Damage,
    Heal,
    Stun,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Damage => "Damage",
            EffectKind::Heal => "Heal",
            EffectKind::Stun => "Stun",
        }
    }

    /// Damage and Stun target enemies; Heal targets allies.
    pub fn is_harmful(&self) -> bool {
        matches!(self, EffectKind::Damage | EffectKind::Stun)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaShape {
    #[default]
    Circle,
    /// Rectangle oriented along the placement facing
    Box,
}

/// Where the instance spawns relative to the caster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SpawnOffset {
    /// At the caster's position
    #[default]
    None,
    /// `distance` units along the caster's facing
    Forward { distance: f32 },
    /// A fixed world-space offset
    Custom { x: f32, y: f32, z: f32 },
}

impl SpawnOffset {
    pub fn offset(&self, facing: Vec3) -> Vec3 {
        match self {
            SpawnOffset::None => Vec3::ZERO,
            SpawnOffset::Forward { distance } => facing.normalize_or_zero() * *distance,
            SpawnOffset::Custom { x, y, z } => Vec3::new(*x, *y, *z),
        }
    }
}

/// Spawn point and orientation of an ability instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub facing: Vec3,
}

/// Final area extents after modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaSize {
    pub radius: f32,
    pub width: f32,
    pub length: f32,
}

fn default_damage_interval() -> f32 {
    DEFAULT_DAMAGE_INTERVAL
}

/// Complete ability configuration loaded from RON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    /// Display name
    pub name: String,
    pub behavior: BehaviorKind,
    pub effect: EffectKind,

    // === Outcome ===
    /// Base damage or healing per application
    pub magnitude: f32,
    /// Minimum seconds between two applications to the same target
    #[serde(default)]
    pub interval: f32,
    /// Base stun duration in seconds (Stun effects)
    #[serde(default)]
    pub stun_duration: f32,
    /// Minimum seconds between two stun damage ticks on the same target
    #[serde(default = "default_damage_interval")]
    pub damage_interval: f32,

    // === Casting ===
    /// Cooldown after cast in seconds
    #[serde(default)]
    pub cooldown: f32,
    /// Seconds the caster stays locked after casting
    #[serde(default)]
    pub casting_time: f32,

    // === Spatial ===
    /// Maximum travel distance
    #[serde(default)]
    pub range: f32,
    /// Travel speed in units/second (Projectile, Arrow, Charge)
    #[serde(default)]
    pub speed: f32,
    /// Lifetime of lingering areas; arming delay of delayed areas
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub area_shape: AreaShape,
    #[serde(default)]
    pub area_radius: f32,
    #[serde(default)]
    pub area_width: f32,
    #[serde(default)]
    pub area_length: f32,
    #[serde(default)]
    pub spawn_offset: SpawnOffset,
}

impl AbilityDefinition {
    fn ability_mods(&self, registry: Option<&FactionModifierRegistry>) -> PerAbilityModifiers {
        registry
            .map(|registry| registry.ability_modifiers(&self.id))
            .unwrap_or_default()
    }

    fn type_mods(
        &self,
        caster_type: ActorType,
        registry: Option<&FactionModifierRegistry>,
    ) -> PerTypeModifiers {
        registry
            .map(|registry| registry.actor_type_modifiers(caster_type))
            .unwrap_or_default()
    }

    /// Damage per application: ability damage channel, then the caster type's damage multiplier.
    pub fn final_damage(&self, caster_type: ActorType, registry: Option<&FactionModifierRegistry>) -> f32 {
        let stage1 = self.ability_mods(registry).damage.resolve(self.magnitude);
        self.type_mods(caster_type, registry).damage.scale(stage1)
    }

    /// Healing per application: ability heal channel, then the caster type's damage multiplier.
    pub fn final_heal(&self, caster_type: ActorType, registry: Option<&FactionModifierRegistry>) -> f32 {
        let stage1 = self.ability_mods(registry).heal.resolve(self.magnitude);
        self.type_mods(caster_type, registry).damage.scale(stage1)
    }

    /// Magnitude for this ability's effect kind.
    pub fn final_magnitude(&self, caster_type: ActorType, registry: Option<&FactionModifierRegistry>) -> f32 {
        match self.effect {
            EffectKind::Heal => self.final_heal(caster_type, registry),
            EffectKind::Damage | EffectKind::Stun => self.final_damage(caster_type, registry),
        }
    }

    pub fn final_cooldown(
        &self,
        registry: Option<&FactionModifierRegistry>,
        caster_global_multiplier: f32,
    ) -> f32 {
        let ability = self.ability_mods(registry).cooldown;
        (self.cooldown * ability.multiplier * caster_global_multiplier).max(0.0)
    }

    pub fn final_stun_duration(&self, registry: Option<&FactionModifierRegistry>) -> f32 {
        self.ability_mods(registry)
            .stun_duration
            .resolve(self.stun_duration)
            .max(0.0)
    }

    pub fn final_range(&self, registry: Option<&FactionModifierRegistry>) -> f32 {
        self.ability_mods(registry).range.resolve(self.range).max(0.0)
    }

    pub fn final_area(&self, registry: Option<&FactionModifierRegistry>) -> AreaSize {
        let area = self.ability_mods(registry).area_size;
        AreaSize {
            radius: area.resolve(self.area_radius).max(0.0),
            width: area.resolve(self.area_width).max(0.0),
            length: area.resolve(self.area_length).max(0.0),
        }
    }

    /// Spawn point for a cast from `position` facing `facing`.
    pub fn spawn_placement(&self, position: Vec3, facing: Vec3) -> Placement {
        Placement {
            position: position + self.spawn_offset.offset(facing),
            facing,
        }
    }
}

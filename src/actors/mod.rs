//! Actor Layer
//!
//! Minimal combat actors for the ability engine: identity, faction, type, health
//! and the per-actor [`AbilityCaster`]. Movement controllers and death sequencing
//! live outside the engine; only what abilities read and mutate is modelled here.
//!
//! ## Module Structure
//! - `roster`: ordered actor store with spatial queries

pub mod roster;

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityCaster, AbilityDefinition, CasterSnapshot};
use crate::constants::{ACTOR_RADIUS, STRUCTURE_RADIUS};
use crate::modifiers::PerTypeModifiers;
use crate::utils::{actor_label, planar};

pub use roster::Roster;

/// Stable identity of an actor within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two sides of a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn all() -> &'static [Faction] {
        &[Faction::Player, Faction::Enemy]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Faction::Player => "Player",
            Faction::Enemy => "Enemy",
        }
    }

    pub fn opponent(&self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// Actor classification used for actor-type modifiers and feature flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorType {
    /// Unclassified actor; never receives actor-type modifiers
    #[default]
    None,
    Knight,
    Archer,
    Mage,
    Minion,
    Tower,
    Castle,
}

impl ActorType {
    pub fn name(&self) -> &'static str {
        match self {
            ActorType::None => "Actor",
            ActorType::Knight => "Knight",
            ActorType::Archer => "Archer",
            ActorType::Mage => "Mage",
            ActorType::Minion => "Minion",
            ActorType::Tower => "Tower",
            ActorType::Castle => "Castle",
        }
    }

    /// Towers and castles: static, no hit feedback visuals.
    pub fn is_structure(&self) -> bool {
        matches!(self, ActorType::Tower | ActorType::Castle)
    }

    /// Unmodified stats for a freshly spawned actor of this type.
    pub fn base_stats(&self) -> ActorStats {
        // (max_health, damage, move_speed, defense, detection_range)
        let (max_health, damage, move_speed, defense, detection_range) = match self {
            ActorType::None => (100.0, 10.0, 3.0, 0.0, 8.0),
            // Heroes
            ActorType::Knight => (220.0, 18.0, 3.5, 4.0, 8.0),
            ActorType::Archer => (140.0, 14.0, 3.2, 1.0, 14.0),
            ActorType::Mage => (120.0, 20.0, 3.0, 0.0, 12.0),
            // Lane units
            ActorType::Minion => (80.0, 8.0, 2.8, 0.0, 6.0),
            // Structures never move
            ActorType::Tower => (600.0, 25.0, 0.0, 8.0, 12.0),
            ActorType::Castle => (1500.0, 0.0, 0.0, 12.0, 10.0),
        };
        ActorStats {
            max_health,
            damage,
            move_speed,
            defense,
            detection_range,
        }
    }
}

/// Numeric stats an actor type carries, before or after modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorStats {
    pub max_health: f32,
    pub damage: f32,
    pub move_speed: f32,
    pub defense: f32,
    pub detection_range: f32,
}

/// Core combat actor: health, status and the owned ability caster.
#[derive(Clone, Debug)]
pub struct Combatant {
    pub id: ActorId,
    pub faction: Faction,
    pub actor_type: ActorType,
    /// World position (Y up, simulation on the XZ plane)
    pub position: Vec3,
    /// Facing direction, used by forward spawn offsets and travelling behaviors
    pub facing: Vec3,
    /// Collision radius for shape queries
    pub radius: f32,
    /// Type stats before modifiers
    pub base: ActorStats,
    /// Stats after the faction's actor-type modifiers
    pub stats: ActorStats,
    pub current_health: f32,
    /// Remaining stun time in seconds
    pub stun_remaining: f32,
    pub caster: AbilityCaster,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
}

impl Combatant {
    pub fn new(id: ActorId, faction: Faction, actor_type: ActorType, position: Vec3) -> Self {
        let base = actor_type.base_stats();
        let radius = if actor_type.is_structure() {
            STRUCTURE_RADIUS
        } else {
            ACTOR_RADIUS
        };
        // Player pushes toward +Z, enemy toward -Z
        let facing = match faction {
            Faction::Player => Vec3::Z,
            Faction::Enemy => Vec3::NEG_Z,
        };
        Self {
            id,
            faction,
            actor_type,
            position,
            facing,
            radius,
            base,
            stats: base,
            current_health: base.max_health,
            stun_remaining: 0.0,
            caster: AbilityCaster::default(),
            damage_dealt: 0.0,
            damage_taken: 0.0,
            healing_done: 0.0,
        }
    }

    pub fn with_abilities(mut self, abilities: Vec<Arc<AbilityDefinition>>) -> Self {
        self.caster = AbilityCaster::new(abilities);
        self
    }

    pub fn label(&self) -> String {
        actor_label(self.faction, self.actor_type, self.id.0)
    }

    pub fn is_enemy_of(&self, other: &Combatant) -> bool {
        self.faction != other.faction
    }

    pub fn is_ally_of(&self, other: &Combatant) -> bool {
        self.faction == other.faction
    }

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0.0
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn max_health(&self) -> f32 {
        self.stats.max_health
    }

    /// Structures do not spawn hit feedback visuals.
    pub fn shows_damage_feedback(&self) -> bool {
        !self.actor_type.is_structure()
    }

    pub fn planar_position(&self) -> Vec2 {
        planar(self.position)
    }

    pub fn snapshot(&self) -> CasterSnapshot {
        CasterSnapshot {
            id: self.id,
            faction: self.faction,
            actor_type: self.actor_type,
        }
    }

    /// Turn to face a world point on the ground plane. No-op when already on top of it.
    pub fn face_towards(&mut self, point: Vec3) {
        let delta = Vec3::new(point.x - self.position.x, 0.0, point.z - self.position.z);
        let direction = delta.normalize_or_zero();
        if direction != Vec3::ZERO {
            self.facing = direction;
        }
    }

    /// Reduce health, floored at zero. Returns the health actually removed.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        if self.is_dead() || amount <= 0.0 {
            return 0.0;
        }
        let dealt = amount.min(self.current_health);
        self.current_health -= dealt;
        self.damage_taken += dealt;
        dealt
    }

    /// Restore health, clamped to max health. Returns the health actually restored.
    pub fn apply_heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() || amount <= 0.0 {
            return 0.0;
        }
        let healed = amount.min(self.stats.max_health - self.current_health).max(0.0);
        self.current_health += healed;
        healed
    }

    /// Stun for `duration` seconds. A shorter stun never cuts a longer one short.
    pub fn apply_stun(&mut self, duration: f32) {
        if self.is_dead() || duration <= 0.0 {
            return;
        }
        self.stun_remaining = self.stun_remaining.max(duration);
    }

    /// Recompute derived stats from the faction's actor-type modifiers.
    ///
    /// Raising max health grants the same amount of current health; lowering it clamps.
    pub fn recalculate_stats(&mut self, modifiers: &PerTypeModifiers) {
        let previous_max = self.stats.max_health;
        self.stats = ActorStats {
            max_health: modifiers.health.resolve(self.base.max_health).max(1.0),
            damage: modifiers.damage.resolve(self.base.damage).max(0.0),
            move_speed: modifiers.move_speed.resolve(self.base.move_speed).max(0.0),
            defense: modifiers.defense.resolve(self.base.defense),
            detection_range: modifiers
                .detection_range
                .resolve(self.base.detection_range)
                .max(0.0),
        };
        if self.is_dead() {
            return;
        }
        let gained = self.stats.max_health - previous_max;
        if gained > 0.0 {
            self.current_health += gained;
        }
        self.current_health = self.current_health.min(self.stats.max_health);
        self.debug_validate();
    }

    /// Advance status timers (stun).
    pub fn tick_status(&mut self, dt: f32) {
        if self.stun_remaining > 0.0 {
            self.stun_remaining = (self.stun_remaining - dt).max(0.0);
        }
    }

    /// Validate that all actor invariants hold.
    ///
    /// In debug builds, this panics on invariant violations.
    /// In release builds, this is a no-op.
    #[inline]
    pub fn debug_validate(&self) {
        debug_assert!(
            self.current_health >= 0.0,
            "Actor health cannot be negative: {}",
            self.current_health
        );
        debug_assert!(
            self.current_health <= self.stats.max_health,
            "Actor health ({}) cannot exceed max_health ({})",
            self.current_health,
            self.stats.max_health
        );
        debug_assert!(
            self.stun_remaining >= 0.0,
            "Stun timer cannot be negative: {}",
            self.stun_remaining
        );
    }
}

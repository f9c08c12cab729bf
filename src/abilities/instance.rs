//! Ability Instances
//!
//! One instance per cast: a behavior, an effect and the gate that throttles the
//! effect. All three are chosen once at construction and never swapped.

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;

use super::behaviors::{Behavior, BehaviorStatus, InstanceContext};
use super::definition::{AbilityDefinition, Placement};
use super::effects::{CasterSnapshot, Effect, ImpactContext};
use super::gate::TargetEffectGate;
use crate::constants::MAX_INSTANCE_LIFETIME;
use crate::modifiers::FactionModifierRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance {}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct AbilityInstance {
    pub id: InstanceId,
    pub definition: Arc<AbilityDefinition>,
    pub caster: CasterSnapshot,
    behavior: Behavior,
    effect: Effect,
    gate: TargetEffectGate,
    /// Seconds since spawn
    pub age: f32,
}

/// Build the instance for one cast: effect first, its gate, then the behavior.
pub fn build_instance(
    id: InstanceId,
    definition: Arc<AbilityDefinition>,
    caster: CasterSnapshot,
    placement: Placement,
    origin: Vec3,
    registry: Option<&FactionModifierRegistry>,
) -> AbilityInstance {
    let effect = Effect::new(Arc::clone(&definition));
    let gate = TargetEffectGate::new(definition.interval);
    let behavior = Behavior::initialize(&definition, placement, origin, registry);
    AbilityInstance {
        id,
        definition,
        caster,
        behavior,
        effect,
        gate,
        age: 0.0,
    }
}

impl AbilityInstance {
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub fn gate(&self) -> &TargetEffectGate {
        &self.gate
    }

    /// Run the spawn-time strike.
    pub fn on_spawn(&mut self, impact: &mut ImpactContext) {
        let mut ctx = InstanceContext {
            dt: 0.0,
            gate: &mut self.gate,
            effect: &mut self.effect,
            impact,
        };
        self.behavior.on_spawn(&mut ctx);
    }

    /// Advance one tick. Instances past the lifetime cap finish regardless of behavior.
    pub fn update(&mut self, dt: f32, impact: &mut ImpactContext) -> BehaviorStatus {
        self.age += dt;
        if self.age > MAX_INSTANCE_LIFETIME {
            debug!("{} ({}) hit the lifetime cap", self.id, self.definition.id);
            return BehaviorStatus::Finished;
        }
        let mut ctx = InstanceContext {
            dt,
            gate: &mut self.gate,
            effect: &mut self.effect,
            impact,
        };
        self.behavior.update(&mut ctx)
    }
}

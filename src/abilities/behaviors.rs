//! Ability Behaviors
//!
//! Kinematic bodies of ability instances. A behavior owns where the instance is
//! and how long it lives; it touches targets only by handing a [`QueryShape`] to
//! the instance's gate through [`InstanceContext::strike`].
//!
//! All behaviors are deliberately simple straight-line or stationary shapes.

use bevy::prelude::*;

use super::definition::{AbilityDefinition, AreaShape, AreaSize, BehaviorKind, Placement};
use super::effects::{Effect, ImpactContext};
use super::gate::TargetEffectGate;
use super::shapes::QueryShape;
use crate::actors::ActorId;
use crate::constants::{CHARGE_HIT_LENGTH, CHARGE_HIT_WIDTH, PROJECTILE_HIT_RADIUS};
use crate::modifiers::{FactionModifierRegistry, FeatureId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorStatus {
    Running,
    Finished,
}

/// Per-tick view handed to a behavior: frame delta plus the instance's gate and effect.
pub struct InstanceContext<'i, 'a> {
    pub dt: f32,
    pub gate: &'i mut TargetEffectGate,
    pub effect: &'i mut Effect,
    pub impact: &'i mut ImpactContext<'a>,
}

impl InstanceContext<'_, '_> {
    /// Run the gate over `shape`. Returns the targets struck.
    pub fn strike(&mut self, shape: &QueryShape) -> Vec<ActorId> {
        self.gate.resolve(shape, self.effect, self.impact)
    }

    fn caster_position(&self) -> Option<(Vec3, Vec3)> {
        self.impact
            .roster
            .get(self.impact.caster.id)
            .filter(|caster| !caster.is_dead())
            .map(|caster| (caster.position, caster.facing))
    }
}

// ============================================================================
// Travelling
// ============================================================================

/// Straight-line flight along the placement facing.
#[derive(Clone, Debug)]
pub struct Missile {
    pub position: Vec3,
    direction: Vec3,
    speed: f32,
    max_distance: f32,
    traveled: f32,
    hit_radius: f32,
    /// Arrows may keep flying after a hit
    can_pierce: bool,
}

impl Missile {
    fn new(definition: &AbilityDefinition, placement: Placement, registry: Option<&FactionModifierRegistry>, can_pierce: bool) -> Self {
        let direction = flat_direction(placement.facing);
        Self {
            position: placement.position,
            direction,
            speed: definition.speed.max(0.0),
            max_distance: definition.final_range(registry),
            traveled: 0.0,
            hit_radius: definition.final_area(registry).radius.max(PROJECTILE_HIT_RADIUS),
            can_pierce,
        }
    }

    fn update(&mut self, ctx: &mut InstanceContext) -> BehaviorStatus {
        let step = (self.speed * ctx.dt).min(self.max_distance - self.traveled).max(0.0);
        self.position += self.direction * step;
        self.traveled += step;

        let hits = ctx.strike(&QueryShape::circle(self.position, self.hit_radius));
        let piercing = self.can_pierce
            && ctx
                .impact
                .registry
                .is_some_and(|registry| registry.feature(ctx.impact.caster.actor_type, FeatureId::Piercing));
        if !hits.is_empty() && !piercing {
            return BehaviorStatus::Finished;
        }
        if self.traveled >= self.max_distance || self.speed <= 0.0 {
            return BehaviorStatus::Finished;
        }
        BehaviorStatus::Running
    }
}

/// Drives the caster forward, striking a box in front of it.
#[derive(Clone, Debug)]
pub struct ChargeBehavior {
    direction: Vec3,
    speed: f32,
    max_distance: f32,
    traveled: f32,
    width: f32,
    length: f32,
}

impl ChargeBehavior {
    fn new(definition: &AbilityDefinition, placement: Placement, registry: Option<&FactionModifierRegistry>) -> Self {
        let area = definition.final_area(registry);
        Self {
            direction: flat_direction(placement.facing),
            speed: definition.speed.max(0.0),
            max_distance: definition.final_range(registry),
            traveled: 0.0,
            width: if area.width > 0.0 { area.width } else { CHARGE_HIT_WIDTH },
            length: if area.length > 0.0 { area.length } else { CHARGE_HIT_LENGTH },
        }
    }

    fn update(&mut self, ctx: &mut InstanceContext) -> BehaviorStatus {
        let caster_id = ctx.impact.caster.id;
        let Some(caster) = ctx.impact.roster.get_mut(caster_id) else {
            return BehaviorStatus::Finished;
        };
        // A stunned or dead caster stops charging
        if caster.is_dead() || caster.is_stunned() {
            return BehaviorStatus::Finished;
        }
        let step = (self.speed * ctx.dt).min(self.max_distance - self.traveled).max(0.0);
        caster.position += self.direction * step;
        caster.facing = self.direction;
        self.traveled += step;
        let front = caster.position + self.direction * (caster.radius + self.length * 0.5);

        ctx.strike(&QueryShape::oriented_box(front, self.direction, self.width, self.length));
        if self.traveled >= self.max_distance || self.speed <= 0.0 {
            BehaviorStatus::Finished
        } else {
            BehaviorStatus::Running
        }
    }
}

// ============================================================================
// Areas
// ============================================================================

/// Lingering area: strikes on spawn, then every tick until `remaining` runs out.
#[derive(Clone, Debug)]
pub struct AreaBehavior {
    pub center: Vec3,
    facing: Vec3,
    shape: AreaShape,
    size: AreaSize,
    remaining: f32,
}

impl AreaBehavior {
    fn new(definition: &AbilityDefinition, placement: Placement, registry: Option<&FactionModifierRegistry>) -> Self {
        Self {
            center: placement.position,
            facing: placement.facing,
            shape: definition.area_shape,
            size: definition.final_area(registry),
            remaining: definition.duration.max(0.0),
        }
    }

    fn query_shape(&self) -> QueryShape {
        QueryShape::from_area(self.shape, self.size, self.center, self.facing)
    }

    fn move_to(&mut self, center: Vec3, facing: Vec3) {
        self.center = center;
        self.facing = facing;
    }

    fn on_spawn(&mut self, ctx: &mut InstanceContext) {
        let shape = self.query_shape();
        ctx.strike(&shape);
    }

    fn update(&mut self, ctx: &mut InstanceContext) -> BehaviorStatus {
        self.remaining -= ctx.dt;
        if self.remaining < 0.0 {
            return BehaviorStatus::Finished;
        }
        let shape = self.query_shape();
        ctx.strike(&shape);
        BehaviorStatus::Running
    }
}

/// Arms for `remaining` seconds, then strikes exactly once.
#[derive(Clone, Debug)]
pub struct DelayedArea {
    area: AreaBehavior,
}

impl DelayedArea {
    fn update(&mut self, ctx: &mut InstanceContext) -> BehaviorStatus {
        self.area.remaining -= ctx.dt;
        if self.area.remaining > 0.0 {
            return BehaviorStatus::Running;
        }
        let shape = self.area.query_shape();
        ctx.strike(&shape);
        BehaviorStatus::Finished
    }
}

/// Purely positional: keeps a fixed offset from the caster.
#[derive(Clone, Debug)]
pub struct FollowAnchor {
    offset: Vec3,
}

impl FollowAnchor {
    fn new(placement: Placement, origin: Vec3) -> Self {
        Self {
            offset: placement.position - origin,
        }
    }

    /// Anchor position this tick, or `None` once the caster is gone.
    fn track(&self, ctx: &InstanceContext) -> Option<(Vec3, Vec3)> {
        ctx.caster_position()
            .map(|(position, facing)| (position + self.offset, facing))
    }
}

/// Area that tracks the caster. Starts striking on its first update.
#[derive(Clone, Debug)]
pub struct FollowBehavior {
    anchor: FollowAnchor,
    area: AreaBehavior,
}

impl FollowBehavior {
    fn update(&mut self, ctx: &mut InstanceContext) -> BehaviorStatus {
        let Some((center, facing)) = self.anchor.track(ctx) else {
            return BehaviorStatus::Finished;
        };
        self.area.move_to(center, facing);
        self.area.update(ctx)
    }
}

// ============================================================================
// Behavior
// ============================================================================

#[derive(Clone, Debug)]
pub enum Behavior {
    Projectile(Missile),
    Arrow(Missile),
    Area(AreaBehavior),
    Follow(FollowBehavior),
    DelayedArea(DelayedArea),
    Charge(ChargeBehavior),
    /// Positional follow anchor plus an area that drives the timing
    Composite {
        positional: FollowAnchor,
        timing: AreaBehavior,
    },
}

impl Behavior {
    /// Build the behavior for a cast. `origin` is the caster position at cast time.
    pub fn initialize(
        definition: &AbilityDefinition,
        placement: Placement,
        origin: Vec3,
        registry: Option<&FactionModifierRegistry>,
    ) -> Self {
        match definition.behavior {
            BehaviorKind::Projectile => {
                Behavior::Projectile(Missile::new(definition, placement, registry, false))
            }
            BehaviorKind::Arrow => Behavior::Arrow(Missile::new(definition, placement, registry, true)),
            BehaviorKind::AreaEffect => Behavior::Area(AreaBehavior::new(definition, placement, registry)),
            BehaviorKind::Follow => Behavior::Follow(FollowBehavior {
                anchor: FollowAnchor::new(placement, origin),
                area: AreaBehavior::new(definition, placement, registry),
            }),
            BehaviorKind::DelayedDamageArea => Behavior::DelayedArea(DelayedArea {
                area: AreaBehavior::new(definition, placement, registry),
            }),
            BehaviorKind::DebuffArea => Behavior::Composite {
                positional: FollowAnchor::new(placement, origin),
                timing: AreaBehavior::new(definition, placement, registry),
            },
            BehaviorKind::Charge => Behavior::Charge(ChargeBehavior::new(definition, placement, registry)),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Projectile(_) => BehaviorKind::Projectile,
            Behavior::Arrow(_) => BehaviorKind::Arrow,
            Behavior::Area(_) => BehaviorKind::AreaEffect,
            Behavior::Follow(_) => BehaviorKind::Follow,
            Behavior::DelayedArea(_) => BehaviorKind::DelayedDamageArea,
            Behavior::Charge(_) => BehaviorKind::Charge,
            Behavior::Composite { .. } => BehaviorKind::DebuffArea,
        }
    }

    /// Immediate strike at spawn. Only the area-driven kinds strike here.
    pub fn on_spawn(&mut self, ctx: &mut InstanceContext) {
        match self {
            Behavior::Area(area) => area.on_spawn(ctx),
            Behavior::Composite { timing, .. } => timing.on_spawn(ctx),
            Behavior::Projectile(_)
            | Behavior::Arrow(_)
            | Behavior::Follow(_)
            | Behavior::DelayedArea(_)
            | Behavior::Charge(_) => {}
        }
    }

    pub fn update(&mut self, ctx: &mut InstanceContext) -> BehaviorStatus {
        match self {
            Behavior::Projectile(missile) | Behavior::Arrow(missile) => missile.update(ctx),
            Behavior::Area(area) => area.update(ctx),
            Behavior::Follow(follow) => follow.update(ctx),
            Behavior::DelayedArea(delayed) => delayed.update(ctx),
            Behavior::Charge(charge) => charge.update(ctx),
            Behavior::Composite { positional, timing } => {
                let Some((center, facing)) = positional.track(ctx) else {
                    return BehaviorStatus::Finished;
                };
                timing.move_to(center, facing);
                timing.update(ctx)
            }
        }
    }

    /// Current world position of the instance, if it has one of its own.
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Behavior::Projectile(missile) | Behavior::Arrow(missile) => Some(missile.position),
            Behavior::Area(area) => Some(area.center),
            Behavior::Follow(follow) => Some(follow.area.center),
            Behavior::DelayedArea(delayed) => Some(delayed.area.center),
            Behavior::Composite { timing, .. } => Some(timing.center),
            Behavior::Charge(_) => None,
        }
    }
}

fn flat_direction(facing: Vec3) -> Vec3 {
    let direction = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
    if direction == Vec3::ZERO {
        Vec3::Z
    } else {
        direction
    }
}

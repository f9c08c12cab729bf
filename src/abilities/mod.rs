//! Ability System
//!
//! Everything between "actor wants to cast slot i" and "target health changed".
//!
//! ## Module Structure
//! - `definition`: immutable ability data and derived-value getters
//! - `config`: RON catalog loading and validation
//! - `caster`: per-actor cooldown table and cast lock
//! - `instance`: per-cast composition root and its factory
//! - `behaviors`: kinematic bodies (projectile, area, follow, charge, ...)
//! - `effects`: damage, heal and stun appliers
//! - `gate`: spatial query plus per-target throttle
//! - `shapes`: ground-plane overlap tests

pub mod behaviors;
pub mod caster;
pub mod config;
pub mod definition;
pub mod effects;
pub mod gate;
pub mod instance;
pub mod shapes;

pub use behaviors::{Behavior, BehaviorStatus, InstanceContext};
pub use caster::{AbilityCaster, CastRejection};
pub use config::{AbilitiesConfig, AbilityCatalog, DEFAULT_ABILITIES_PATH};
pub use definition::{
    AbilityDefinition, AbilityId, AreaShape, AreaSize, BehaviorKind, EffectKind, Placement,
    SpawnOffset,
};
pub use effects::{CasterSnapshot, Effect, ImpactContext};
pub use gate::TargetEffectGate;
pub use instance::{build_instance, AbilityInstance, InstanceId};
pub use shapes::QueryShape;

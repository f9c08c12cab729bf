//! Simulation Constants
//!
//! Centralized location for magic numbers used throughout the ability engine.
//! This makes it easier to tune balance and ensures consistency.

// ============================================================================
// Timing
// ============================================================================

/// Fixed timestep used by the headless runner (60 ticks per second)
pub const HEADLESS_TIMESTEP: f32 = 1.0 / 60.0;

/// Slack when comparing elapsed time against an interval, absorbing float
/// rounding of accumulated frame deltas
pub const TIME_EPSILON: f32 = 1e-4;

/// Default spacing between two damage ticks of a stun effect on the same target
pub const DEFAULT_DAMAGE_INTERVAL: f32 = 1.0;

/// Hard cap on the lifetime of any ability instance.
/// Behaviors normally terminate themselves long before this.
pub const MAX_INSTANCE_LIFETIME: f32 = 30.0;

// ============================================================================
// Spatial
// ============================================================================

/// Hit radius of a projectile or arrow when the definition has no area radius
pub const PROJECTILE_HIT_RADIUS: f32 = 0.5;

/// Width of the box swept in front of a charging actor
pub const CHARGE_HIT_WIDTH: f32 = 1.5;

/// Length of the box swept in front of a charging actor
pub const CHARGE_HIT_LENGTH: f32 = 1.0;

/// Default collision radius for non-structure actors
pub const ACTOR_RADIUS: f32 = 0.5;

/// Collision radius for towers and castles
pub const STRUCTURE_RADIUS: f32 = 2.0;

// ============================================================================
// Economy
// ============================================================================

/// Passive gold income per second before income modifiers
pub const BASE_GOLD_INCOME: f32 = 2.0;

/// Fraction of the structure's current health consumed by a sacrifice upgrade
pub const SACRIFICE_HEALTH_FRACTION: f32 = 0.5;

/// Permanent income multiplier delta granted by a sacrifice upgrade (+25%)
pub const SACRIFICE_INCOME_BOOST: f32 = 0.25;

// ============================================================================
// Presentation
// ============================================================================

/// Lifetime of hit/heal/stun feedback visuals in seconds
pub const TRANSIENT_VISUAL_SECS: f32 = 0.6;

/// Lifetime of the cast flash spawned at the placement point
pub const CAST_VISUAL_SECS: f32 = 0.3;

//! Ability Caster
//!
//! Per-actor cooldown table and cast lock.
//!
//! ```text
//! Ready --begin_cast--> Casting --release_lock (after casting_time)--> Ready
//! ```
//! Cooldowns run per slot, orthogonal to the lock: a slot's cooldown starts the
//! moment it is cast, not when the lock releases.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::definition::AbilityDefinition;

/// Why a cast request was refused. Refusals never mutate caster state.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CastRejection {
    #[error("simulation is paused")]
    Paused,
    #[error("unknown actor")]
    UnknownActor,
    #[error("caster is dead")]
    Dead,
    #[error("no ability in slot {0}")]
    UnknownSlot(usize),
    #[error("slot on cooldown ({remaining:.2}s remaining)")]
    OnCooldown { remaining: f32 },
    #[error("caster is locked by an ongoing cast")]
    Locked,
    #[error("caster is stunned")]
    Stunned,
}

#[derive(Clone, Debug)]
pub struct AbilityCaster {
    slots: Vec<Arc<AbilityDefinition>>,
    cooldowns: BTreeMap<usize, f32>,
    locked: bool,
    /// Actor-wide cooldown scale, chained after the ability's own cooldown multiplier
    pub global_cooldown_multiplier: f32,
}

impl Default for AbilityCaster {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            cooldowns: BTreeMap::new(),
            locked: false,
            global_cooldown_multiplier: 1.0,
        }
    }
}

impl AbilityCaster {
    pub fn new(slots: Vec<Arc<AbilityDefinition>>) -> Self {
        Self {
            slots,
            ..Default::default()
        }
    }

    pub fn slot(&self, slot: usize) -> Option<&Arc<AbilityDefinition>> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> &[Arc<AbilityDefinition>] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn cooldown_remaining(&self, slot: usize) -> f32 {
        self.cooldowns.get(&slot).copied().unwrap_or(0.0)
    }

    pub fn is_ready(&self, slot: usize) -> bool {
        self.cooldown_remaining(slot) <= 0.0
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Check the caster-local cast preconditions for a slot.
    pub fn check_ready(&self, slot: usize, stunned: bool) -> Result<&Arc<AbilityDefinition>, CastRejection> {
        let definition = self.slots.get(slot).ok_or(CastRejection::UnknownSlot(slot))?;
        if !self.is_ready(slot) {
            return Err(CastRejection::OnCooldown {
                remaining: self.cooldown_remaining(slot),
            });
        }
        if self.locked {
            return Err(CastRejection::Locked);
        }
        if stunned {
            return Err(CastRejection::Stunned);
        }
        Ok(definition)
    }

    /// Lock the caster and start the slot's cooldown.
    pub fn begin_cast(&mut self, slot: usize, cooldown: f32) {
        self.locked = true;
        self.cooldowns.insert(slot, cooldown.max(0.0));
    }

    pub fn release_lock(&mut self) {
        self.locked = false;
    }

    /// Decrement every positive cooldown, clamping at zero.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for remaining in self.cooldowns.values_mut() {
            if *remaining > 0.0 {
                *remaining = (*remaining - dt).max(0.0);
            }
        }
    }

    pub fn reset_cooldowns(&mut self) {
        self.cooldowns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::definition::{AbilityId, AreaShape, BehaviorKind, EffectKind, SpawnOffset};

    fn caster() -> AbilityCaster {
        let definition = AbilityDefinition {
            id: AbilityId::new("slash"),
            name: "Slash".to_string(),
            behavior: BehaviorKind::AreaEffect,
            effect: EffectKind::Damage,
            magnitude: 10.0,
            interval: 1.0,
            stun_duration: 0.0,
            damage_interval: 1.0,
            cooldown: 2.0,
            casting_time: 0.5,
            range: 0.0,
            speed: 0.0,
            duration: 0.0,
            area_shape: AreaShape::Circle,
            area_radius: 1.5,
            area_width: 0.0,
            area_length: 0.0,
            spawn_offset: SpawnOffset::None,
        };
        AbilityCaster::new(vec![Arc::new(definition)])
    }

    #[test]
    fn test_cooldown_clamps_at_zero() {
        let mut caster = caster();
        caster.begin_cast(0, 1.0);
        caster.tick(0.4);
        assert!((caster.cooldown_remaining(0) - 0.6).abs() < 1e-6);
        caster.tick(5.0);
        assert_eq!(caster.cooldown_remaining(0), 0.0);
        assert!(caster.is_ready(0));
    }

    #[test]
    fn test_rejection_order() {
        let mut caster = caster();
        assert_eq!(caster.check_ready(3, false).unwrap_err(), CastRejection::UnknownSlot(3));
        assert_eq!(caster.check_ready(0, true).unwrap_err(), CastRejection::Stunned);

        caster.begin_cast(0, 2.0);
        assert!(matches!(
            caster.check_ready(0, false),
            Err(CastRejection::OnCooldown { .. })
        ));

        caster.reset_cooldowns();
        assert_eq!(caster.check_ready(0, false).unwrap_err(), CastRejection::Locked);
        caster.release_lock();
        assert!(caster.check_ready(0, false).is_ok());
    }

    #[test]
    fn test_default_global_multiplier_is_identity() {
        assert_eq!(AbilityCaster::default().global_cooldown_multiplier, 1.0);
    }
}

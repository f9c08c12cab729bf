//! Target Effect Gate
//!
//! Couples a spatial query with a per-target throttle: a target inside the shape
//! is struck again only once `interval` seconds have passed since its last
//! application by the same instance.

use std::collections::BTreeMap;

use super::effects::{Effect, ImpactContext};
use super::shapes::QueryShape;
use crate::actors::ActorId;
use crate::utils::interval_elapsed;

#[derive(Clone, Debug, Default)]
pub struct TargetEffectGate {
    interval: f32,
    last_applied_at: BTreeMap<ActorId, f32>,
}

impl TargetEffectGate {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            last_applied_at: BTreeMap::new(),
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Record an application at `now` if the target's throttle has elapsed.
    pub fn admit(&mut self, target: ActorId, now: f32) -> bool {
        let last = self
            .last_applied_at
            .get(&target)
            .copied()
            .unwrap_or(f32::NEG_INFINITY);
        if interval_elapsed(now, last, self.interval) {
            self.last_applied_at.insert(target, now);
            true
        } else {
            false
        }
    }

    pub fn last_applied(&self, target: ActorId) -> Option<f32> {
        self.last_applied_at.get(&target).copied()
    }

    /// Strike every eligible target inside `shape`, in ascending id order.
    ///
    /// Returns the ids that received an application.
    pub fn resolve(
        &mut self,
        shape: &QueryShape,
        effect: &mut Effect,
        ctx: &mut ImpactContext,
    ) -> Vec<ActorId> {
        let mut struck = Vec::new();
        for target in ctx.roster.query(shape) {
            if !effect.can_apply(target, ctx) {
                continue;
            }
            if !self.admit(target, ctx.now) {
                continue;
            }
            if effect.apply(target, ctx) {
                struck.push(target);
            }
        }
        struck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_per_target() {
        let mut gate = TargetEffectGate::new(0.5);
        let a = ActorId(1);
        let b = ActorId(2);

        assert!(gate.admit(a, 0.0));
        assert!(!gate.admit(a, 0.4));
        assert!(gate.admit(b, 0.4));
        assert!(gate.admit(a, 0.6));
        assert_eq!(gate.last_applied(a), Some(0.6));
    }

    #[test]
    fn test_zero_interval_admits_every_time() {
        let mut gate = TargetEffectGate::new(0.0);
        assert!(gate.admit(ActorId(1), 1.0));
        assert!(gate.admit(ActorId(1), 1.0));
    }
}

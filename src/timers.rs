//! Deferred Continuations
//!
//! A tick-driven scheduler standing in for coroutines: work that should happen
//! "after N seconds" is queued here and fired by `Session::tick`. Nothing
//! advances while the simulation is paused because a paused tick passes zero.

use std::collections::BTreeMap;

use crate::actors::ActorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContinuationId(pub u64);

/// Work a continuation performs when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// End the owner's cast lock after the casting time
    ReleaseCastLock { slot: usize },
}

#[derive(Clone, Debug)]
struct Pending {
    owner: ActorId,
    remaining: f32,
    continuation: Continuation,
}

/// A continuation that came due this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub id: ContinuationId,
    pub owner: ActorId,
    pub continuation: Continuation,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    pending: BTreeMap<ContinuationId, Pending>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, owner: ActorId, delay: f32, continuation: Continuation) -> ContinuationId {
        self.next_id += 1;
        let id = ContinuationId(self.next_id);
        self.pending.insert(
            id,
            Pending {
                owner,
                remaining: delay.max(0.0),
                continuation,
            },
        );
        id
    }

    /// Advance every pending continuation by `dt` and return the ones that came due,
    /// in scheduling order. A non-positive `dt` fires nothing.
    pub fn advance(&mut self, dt: f32) -> Vec<Fired> {
        if dt <= 0.0 {
            return Vec::new();
        }
        let mut fired = Vec::new();
        for (id, pending) in self.pending.iter_mut() {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                fired.push(Fired {
                    id: *id,
                    owner: pending.owner,
                    continuation: pending.continuation,
                });
            }
        }
        for entry in &fired {
            self.pending.remove(&entry.id);
        }
        fired
    }

    pub fn cancel(&mut self, id: ContinuationId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Cancel everything owned by an actor. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: ActorId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, pending| pending.owner != owner);
        before - self.pending.len()
    }

    pub fn remaining(&self, id: ContinuationId) -> Option<f32> {
        self.pending.get(&id).map(|pending| pending.remaining)
    }

    pub fn pending_for(&self, owner: ActorId) -> usize {
        self.pending
            .values()
            .filter(|pending| pending.owner == owner)
            .count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE: Continuation = Continuation::ReleaseCastLock { slot: 0 };

    #[test]
    fn test_fires_after_delay() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(ActorId(1), 0.5, RELEASE);

        assert!(scheduler.advance(0.3).is_empty());
        assert!((scheduler.remaining(id).unwrap() - 0.2).abs() < 1e-6);

        let fired = scheduler.advance(0.3);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].owner, ActorId(1));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_zero_dt_is_frozen() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(ActorId(1), 0.0, RELEASE);
        assert!(scheduler.advance(0.0).is_empty());
        assert_eq!(scheduler.remaining(id), Some(0.0));
    }

    #[test]
    fn test_cancel_owner() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ActorId(1), 1.0, RELEASE);
        scheduler.schedule(ActorId(2), 1.0, RELEASE);
        scheduler.schedule(ActorId(1), 2.0, RELEASE);

        assert_eq!(scheduler.cancel_owner(ActorId(1)), 2);
        assert_eq!(scheduler.pending_for(ActorId(2)), 1);
        assert_eq!(scheduler.advance(5.0).len(), 1);
    }
}

//! Presentation Queue
//!
//! Fire-and-forget requests for transient visuals. The core only enqueues; the
//! host drains the queue once per frame (the plugin forwards each request as a
//! Bevy event).

use bevy::prelude::*;

use crate::actors::ActorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualKind {
    /// Damage landed on a target
    Hit,
    Heal,
    Stun,
    /// Cast flash at the spawn point
    Cast,
}

/// One transient visual to spawn.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct VisualRequest {
    pub kind: VisualKind,
    pub position: Vec3,
    pub target: Option<ActorId>,
    /// Seconds the visual should stay on screen
    pub duration: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PresentationQueue {
    pending: Vec<VisualRequest>,
}

impl PresentationQueue {
    pub fn spawn_transient(
        &mut self,
        kind: VisualKind,
        position: Vec3,
        target: Option<ActorId>,
        duration: f32,
    ) {
        self.pending.push(VisualRequest {
            kind,
            position,
            target,
            duration,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<VisualRequest> {
        std::mem::take(&mut self.pending)
    }
}

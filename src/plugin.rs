//! Bevy Integration
//!
//! Wraps a [`Session`] as a resource and drives it from Bevy's `Update` schedule.
//!
//! ## System Phases
//!
//! 1. **Control** - controllers queue casts and upgrades against the session
//! 2. **Simulate** - `Session::tick` with the frame's real delta
//! 3. **Publish** - queued visuals and feature changes become Bevy events
//!
//! ## Usage
//!
//! ```ignore
//! App::new()
//!     .add_plugins(MinimalPlugins)
//!     .add_plugins(LanecastPlugin { seed: Some(7) })
//!     .add_systems(Update, my_controller.in_set(SessionPhase::Control));
//! ```

use bevy::prelude::*;

use crate::presentation::VisualRequest;
use crate::rng::GameRng;
use crate::session::{FeatureChangedEvent, Session};

/// System set labels for session ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Control,
    Simulate,
    Publish,
}

/// Configures the ordering between session phases.
pub fn configure_session_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SessionPhase::Control,
            SessionPhase::Simulate,
            SessionPhase::Publish,
        )
            .chain(),
    );
}

pub struct LanecastPlugin {
    /// Seed for the session RNG; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Plugin for LanecastPlugin {
    fn build(&self, app: &mut App) {
        if let Some(seed) = self.seed {
            info!("Using deterministic RNG with seed: {}", seed);
        }
        configure_session_ordering(app);
        app.insert_resource(Session::new(GameRng::from_optional_seed(self.seed)))
            .add_event::<VisualRequest>()
            .add_event::<FeatureChangedEvent>()
            .add_systems(Update, advance_session.in_set(SessionPhase::Simulate))
            .add_systems(Update, publish_session_output.in_set(SessionPhase::Publish));
    }
}

/// Advance the session by the frame's real delta.
pub fn advance_session(time: Res<Time>, mut session: ResMut<Session>) {
    session.tick(time.delta_secs());
}

/// Forward queued presentation requests and feature changes as events.
pub fn publish_session_output(
    mut session: ResMut<Session>,
    mut visuals: EventWriter<VisualRequest>,
    mut features: EventWriter<FeatureChangedEvent>,
) {
    visuals.send_batch(session.drain_visuals());
    features.send_batch(session.drain_feature_changes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityCatalog, AbilityId};
    use crate::actors::{ActorType, Faction};
    use crate::modifiers::FeatureId;
    use std::sync::Arc;

    fn create_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(LanecastPlugin { seed: Some(5) });
        app
    }

    #[test]
    fn test_plugin_inserts_session() {
        let mut app = create_app();
        app.update();
        assert!(app.world().get_resource::<Session>().is_some());
    }

    #[test]
    fn test_feature_changes_become_events() {
        let mut app = create_app();
        app.world_mut()
            .resource_mut::<Session>()
            .registry_mut(Faction::Player)
            .set_feature(ActorType::Archer, FeatureId::Piercing, true);

        app.update();

        let events = app.world().resource::<Events<FeatureChangedEvent>>();
        assert_eq!(events.len(), 1);
        assert!(app
            .world_mut()
            .resource_mut::<Session>()
            .drain_feature_changes()
            .is_empty());
    }

    #[test]
    fn test_cast_visuals_are_published() {
        let catalog = AbilityCatalog::load_default().unwrap();
        let cleave = Arc::clone(catalog.get(&AbilityId::new("cleave")).unwrap());
        let mut app = create_app();
        {
            let mut session = app.world_mut().resource_mut::<Session>();
            let knight =
                session.spawn_actor(Faction::Player, ActorType::Knight, Vec3::ZERO, vec![cleave]);
            session.invoke(knight, 0).unwrap();
        }

        app.update();

        assert!(!app.world().resource::<Events<VisualRequest>>().is_empty());
        assert!(app.world_mut().resource_mut::<Session>().drain_visuals().is_empty());
    }
}

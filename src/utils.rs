//! Shared Utility Functions
//!
//! Small helpers used by several modules. The simulation runs on the XZ ground
//! plane with Y up, the same convention as Bevy's 3D transforms.

use bevy::prelude::*;

use crate::actors::{ActorType, Faction};
use crate::constants::TIME_EPSILON;

/// Project a world position onto the ground plane.
pub fn planar(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Ground-plane unit direction for a facing vector, defaulting to +Z when degenerate.
pub fn planar_direction(facing: Vec3) -> Vec2 {
    let direction = planar(facing).normalize_or_zero();
    if direction == Vec2::ZERO {
        Vec2::Y
    } else {
        direction
    }
}

/// Whether at least `interval` seconds separate `last` from `now`.
pub fn interval_elapsed(now: f32, last: f32, interval: f32) -> bool {
    now - last + TIME_EPSILON >= interval
}

/// Helper to generate a consistent actor label for the combat log.
///
/// Format: "{faction} {type} #{id}" e.g., "Player Knight #3"
pub fn actor_label(faction: Faction, actor_type: ActorType, id: u32) -> String {
    format!("{} {} #{}", faction.name(), actor_type.name(), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_elapsed_tolerates_accumulated_deltas() {
        let step = 1.0_f32 / 60.0;
        let mut now = 0.0_f32;
        for _ in 0..60 {
            now += step;
        }
        assert!(interval_elapsed(now, 0.0, 1.0));
        assert!(!interval_elapsed(now - step, 0.0, 1.0));
        assert!(interval_elapsed(0.0, f32::NEG_INFINITY, 5.0));
    }

    #[test]
    fn test_planar_drops_height() {
        assert_eq!(planar(Vec3::new(1.0, 5.0, -2.0)), Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_degenerate_facing_points_forward() {
        assert_eq!(planar_direction(Vec3::ZERO), Vec2::Y);
        assert_eq!(planar_direction(Vec3::Y), Vec2::Y);
        assert_eq!(planar_direction(Vec3::new(3.0, 0.0, 0.0)), Vec2::X);
    }

    #[test]
    fn test_actor_label_format() {
        assert_eq!(actor_label(Faction::Player, ActorType::Knight, 3), "Player Knight #3");
        assert_eq!(actor_label(Faction::Enemy, ActorType::Castle, 12), "Enemy Castle #12");
    }
}

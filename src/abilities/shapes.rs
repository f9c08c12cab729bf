//! Query Shapes
//!
//! Ground-plane overlap tests between ability areas and actor collision circles.

use bevy::prelude::*;

use super::definition::{AreaShape, AreaSize};
use crate::utils::{planar, planar_direction};

/// An area on the XZ ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueryShape {
    Circle {
        center: Vec2,
        radius: f32,
    },
    /// Rectangle whose length axis runs along `forward`
    OrientedBox {
        center: Vec2,
        half_extents: Vec2,
        forward: Vec2,
    },
}

impl QueryShape {
    pub fn circle(center: Vec3, radius: f32) -> Self {
        QueryShape::Circle {
            center: planar(center),
            radius: radius.max(0.0),
        }
    }

    /// Box of `width` across and `length` along `facing`, centred on `center`.
    pub fn oriented_box(center: Vec3, facing: Vec3, width: f32, length: f32) -> Self {
        QueryShape::OrientedBox {
            center: planar(center),
            half_extents: Vec2::new(width.max(0.0) * 0.5, length.max(0.0) * 0.5),
            forward: planar_direction(facing),
        }
    }

    /// Shape for a configured area at a placement.
    pub fn from_area(shape: AreaShape, size: AreaSize, center: Vec3, facing: Vec3) -> Self {
        match shape {
            AreaShape::Circle => Self::circle(center, size.radius),
            AreaShape::Box => Self::oriented_box(center, facing, size.width, size.length),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            QueryShape::Circle { center, .. } | QueryShape::OrientedBox { center, .. } => *center,
        }
    }

    /// Whether a circle at `point` with `radius` touches this shape.
    pub fn overlaps(&self, point: Vec2, radius: f32) -> bool {
        match *self {
            QueryShape::Circle {
                center,
                radius: shape_radius,
            } => center.distance(point) <= shape_radius + radius,
            QueryShape::OrientedBox {
                center,
                half_extents,
                forward,
            } => {
                // Local frame: x across, y along forward
                let right = -forward.perp();
                let delta = point - center;
                let local = Vec2::new(delta.dot(right), delta.dot(forward));
                let closest = local.clamp(-half_extents, half_extents);
                local.distance(closest) <= radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_counts_touching_edges() {
        let shape = QueryShape::circle(Vec3::ZERO, 2.0);
        assert!(shape.overlaps(Vec2::new(2.5, 0.0), 0.5));
        assert!(!shape.overlaps(Vec2::new(2.6, 0.0), 0.5));
    }

    #[test]
    fn test_box_follows_facing() {
        // 2 wide, 6 long, pointing down +X
        let shape = QueryShape::oriented_box(Vec3::ZERO, Vec3::X, 2.0, 6.0);
        assert!(shape.overlaps(Vec2::new(2.9, 0.0), 0.0));
        assert!(!shape.overlaps(Vec2::new(0.0, 2.9), 0.0));
        assert!(shape.overlaps(Vec2::new(0.0, 1.4), 0.5));
    }

    #[test]
    fn test_degenerate_facing_uses_forward_z() {
        let shape = QueryShape::oriented_box(Vec3::ZERO, Vec3::ZERO, 1.0, 4.0);
        assert!(shape.overlaps(Vec2::new(0.0, 1.9), 0.0));
        assert!(!shape.overlaps(Vec2::new(1.9, 0.0), 0.0));
    }
}

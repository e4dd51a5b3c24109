//! Physics type re-exports from glam plus the 2D primitives shared by the
//! collision queries and the movement core.

pub use glam::Vec2;

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Build a box from its center and full size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap,
    /// so a body resting on a floor never "overlaps" it.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Strict interior test (points on the boundary are outside).
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// Horizontal side of the body, used for wall contact queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center_size() {
        let aabb = Aabb::from_center_size(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert_eq!(aabb.min, Vec2::new(0.0, 0.0));
        assert_eq!(aabb.max, Vec2::new(2.0, 4.0));
        assert_eq!(aabb.center(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let floor = Aabb::new(Vec2::new(-5.0, -1.0), Vec2::new(5.0, 0.0));
        let body = Aabb::new(Vec2::new(-0.5, 0.0), Vec2::new(0.5, 1.0));
        assert!(!floor.overlaps(&body));

        let sunk = body.translated(Vec2::new(0.0, -0.01));
        assert!(floor.overlaps(&sunk));
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Left.sign(), -1.0);
        assert_eq!(Side::Right.sign(), 1.0);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}

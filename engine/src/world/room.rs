//! Room Bounds
//!
//! A room is an axis-aligned rectangle given by its center and size. The
//! character dies when its center leaves the room; camera framing and
//! room-to-room transitions are left to the host.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::Aabb;

/// Edge of a room the character crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomEdge {
    Left,
    Right,
    Up,
    Down,
}

/// Four-edge room boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    /// Center of the room
    pub center: Vec2,
    /// Full width and height
    pub size: Vec2,
}

impl Default for RoomBounds {
    fn default() -> Self {
        // One screen: 32x18 tiles
        Self {
            center: Vec2::ZERO,
            size: Vec2::new(32.0, 18.0),
        }
    }
}

impl RoomBounds {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.size.x * 0.5
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.size.x * 0.5
    }

    pub fn up(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }

    pub fn down(&self) -> f32 {
        self.center.y - self.size.y * 0.5
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }

    /// Whether `point` is inside the room (edges count as inside).
    pub fn contains(&self, point: Vec2) -> bool {
        self.exit_edge(point).is_none()
    }

    /// Which edge `point` is past, if any. Horizontal edges are checked
    /// first.
    pub fn exit_edge(&self, point: Vec2) -> Option<RoomEdge> {
        if point.x > self.right() {
            Some(RoomEdge::Right)
        } else if point.x < self.left() {
            Some(RoomEdge::Left)
        } else if point.y > self.up() {
            Some(RoomEdge::Up)
        } else if point.y < self.down() {
            Some(RoomEdge::Down)
        } else {
            None
        }
    }
}

//! Moving Platforms
//!
//! A platform ping-pongs a solid in a [`TileWorld`] between two points at a
//! constant speed. Characters standing on it are carried by the same delta.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::{Aabb, SolidId, TileWorld};

/// Distance at which a platform counts as having reached its target.
pub const ARRIVE_DISTANCE: f32 = 0.05;

/// Move `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + to_target / distance * max_delta
    }
}

/// Description of a moving platform, as it appears in level files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Start point of the platform's center
    pub begin: Vec2,
    /// End point of the platform's center
    pub end: Vec2,
    /// Full size of the platform
    pub size: Vec2,
    /// Travel speed (units/second)
    pub speed: f32,
}

/// A platform moving back and forth between two points.
#[derive(Debug, Clone)]
pub struct MovingPlatform {
    solid: SolidId,
    begin: Vec2,
    end: Vec2,
    speed: f32,
    position: Vec2,
    going_towards_end: bool,
}

impl MovingPlatform {
    /// Register the platform's solid at `spec.begin` in `world`.
    pub fn spawn(world: &mut TileWorld, spec: PlatformSpec) -> Self {
        let solid = world.add_solid(Aabb::from_center_size(spec.begin, spec.size));
        Self {
            solid,
            begin: spec.begin,
            end: spec.end,
            speed: spec.speed.max(0.0),
            position: spec.begin,
            going_towards_end: true,
        }
    }

    pub fn solid(&self) -> SolidId {
        self.solid
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Vec2 {
        if self.going_towards_end { self.end } else { self.begin }
    }

    /// Advance one tick and return how far the platform moved.
    pub fn step(&mut self, world: &mut TileWorld, dt: f32) -> Vec2 {
        let next = move_towards(self.position, self.target(), self.speed * dt);
        let delta = next - self.position;
        self.position = next;
        world.translate_solid(self.solid, delta);

        if self.position.distance(self.target()) < ARRIVE_DISTANCE {
            self.going_towards_end = !self.going_towards_end;
        }
        delta
    }
}

//! Spring Pads
//!
//! Trigger boxes that launch a character on touch. A pad only fires on the
//! tick contact begins, so standing on it does not launch every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::Aabb;

/// Launch parameters of a spring pad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringSpec {
    pub bounds: Aabb,
    /// Velocity added on launch
    pub launch: Vec2,
    /// Fraction of the jump force added if jump is held or buffered
    pub jump_force_modifier: f32,
    /// Gravity multiplier while rising after the launch
    pub gravity_modifier: f32,
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self {
            bounds: Aabb::from_center_size(Vec2::ZERO, Vec2::new(1.0, 0.25)),
            launch: Vec2::new(0.0, 10.0),
            jump_force_modifier: 0.5,
            gravity_modifier: 1.5,
        }
    }
}

/// A spring pad with contact tracking.
#[derive(Debug, Clone)]
pub struct SpringPad {
    spec: SpringSpec,
    touching: bool,
}

impl SpringPad {
    pub fn new(spec: SpringSpec) -> Self {
        Self {
            spec,
            touching: false,
        }
    }

    pub fn spec(&self) -> &SpringSpec {
        &self.spec
    }

    /// Update contact with a character's collision box. Returns the launch
    /// parameters on the tick contact begins.
    pub fn touch(&mut self, body: &Aabb) -> Option<SpringSpec> {
        let touching = self.spec.bounds.overlaps(&body.translated(Vec2::new(0.0, -SPRING_REACH)));
        let entered = touching && !self.touching;
        self.touching = touching;
        entered.then_some(self.spec)
    }
}

/// How far below the body a pad still counts as touched (a resting body
/// hovers a skin gap above surfaces).
pub const SPRING_REACH: f32 = 0.02;

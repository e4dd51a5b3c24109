//! Corner / Edge Correction
//!
//! Small position and velocity fixes driven by short ray probes around the
//! body:
//!
//! - **Head corners**: clipping a ceiling corner with the outer edge of the
//!   head nudges the body sideways instead of killing the jump.
//! - **Step-up**: a lip lower than the edge range at the feet is climbed.
//! - **Sticky platforms**: standing over a ledge with no input toward it
//!   stops horizontal drift.
//!
//! Probe offsets are relative to the body center, with body size (w, h),
//! edge range e and b = 0.05 * h:
//!
//! ```text
//!          outer  inner      inner  outer
//!   x:  -(w/2-e/8) -(w/2-e)   w/2-e  w/2-e/8      y: h/2 + b, up, length 3b
//!
//!   step rays from (-w/2-e, -h/2) and (-w/2-e, -h/2+e), right, length w+2e
//!   sticky rays from (-e, -h/2-e) and (e, -h/2-e), down, length 2e
//! ```

use glam::Vec2;

use super::config::MovementConfig;
use super::movement::MovementState;
use super::state::CharacterState;
use crate::physics::CollisionQuery;

/// Wall contact this recent (in ticks) suppresses head-corner correction.
pub const HEAD_CORNER_WALL_TICKS: f32 = 3.0;

fn probe_hits<W: CollisionQuery + ?Sized>(world: &W, origin: Vec2, direction: Vec2, length: f32) -> bool {
    world.raycast_solid(origin, direction, length).is_some()
}

/// Nudge sideways around a ceiling corner. Returns the applied x offset.
pub(crate) fn correct_head_corners<W: CollisionQuery + ?Sized>(
    state: &mut MovementState,
    config: &MovementConfig,
    world: &W,
    dt: f32,
) -> f32 {
    let wall_window = dt * HEAD_CORNER_WALL_TICKS;
    if state.machine.current() == CharacterState::Grounded
        || state.timers.since_left_wall().seconds() <= wall_window
        || state.timers.since_right_wall().seconds() <= wall_window
    {
        return 0.0;
    }

    let size = config.body_size;
    let e = config.edge_detection_range;
    let b = size.y * 0.05;
    let y = size.y * 0.5 + b;
    let length = b * 3.0;
    let start = state.position.x;

    // Right side, then left side from the corrected position
    for sign in [1.0_f32, -1.0] {
        let outer = state.position + Vec2::new(sign * (size.x * 0.5 - e / 8.0), y);
        let inner = state.position + Vec2::new(sign * (size.x * 0.5 - e), y);
        if probe_hits(world, outer, Vec2::Y, length) && !probe_hits(world, inner, Vec2::Y, length) {
            state.position.x -= sign * e;
        }
    }

    let offset = state.position.x - start;
    if offset != 0.0 {
        tracing::debug!("head corner correction {:+.3}", offset);
    }
    offset
}

/// Climb a lip shorter than the edge range. Returns whether the body was
/// lifted.
pub(crate) fn step_up<W: CollisionQuery + ?Sized>(
    state: &mut MovementState,
    config: &MovementConfig,
    world: &W,
) -> bool {
    let size = config.body_size;
    let e = config.edge_detection_range;
    let length = size.x + e * 2.0;
    let lower = state.position + Vec2::new(-size.x * 0.5 - e, -size.y * 0.5);
    let upper = state.position + Vec2::new(-size.x * 0.5 - e, -size.y * 0.5 + e);

    if probe_hits(world, lower, Vec2::X, length) && !probe_hits(world, upper, Vec2::X, length) {
        state.position.y += e;
        true
    } else {
        false
    }
}

/// Stop horizontal drift over a ledge. Returns whether velocity was zeroed.
pub(crate) fn stick_to_platform<W: CollisionQuery + ?Sized>(
    state: &mut MovementState,
    config: &MovementConfig,
    world: &W,
) -> bool {
    if !config.sticky_platforms || state.machine.current() != CharacterState::Grounded {
        return false;
    }
    let horizontal = state.axes.horizontal;
    if horizontal != 0.0 && horizontal.signum() == state.velocity.x.signum() {
        return false;
    }

    let e = config.edge_detection_range;
    let y = -config.body_size.y * 0.5 - e;
    let left = probe_hits(world, state.position + Vec2::new(-e, y), Vec2::NEG_Y, e * 2.0);
    let right = probe_hits(world, state.position + Vec2::new(e, y), Vec2::NEG_Y, e * 2.0);

    if left != right {
        state.velocity.x = 0.0;
        true
    } else {
        false
    }
}

/// Full correction pass in order: head corners, step-up, sticky platforms.
pub(crate) fn correct_corners<W: CollisionQuery + ?Sized>(
    state: &mut MovementState,
    config: &MovementConfig,
    world: &W,
    dt: f32,
) {
    correct_head_corners(state, config, world, dt);
    step_up(state, config, world);
    stick_to_platform(state, config, world);
}

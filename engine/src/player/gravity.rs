//! Gravity Resolver
//!
//! State-dependent vertical acceleration with terminal velocity clamps and a
//! wall-slide cap, plus the air-control recovery after a wall jump.
//!
//! Gravity is subtracted once per tick (it is not scaled by dt).

use super::config::MovementConfig;
use super::movement::MovementState;
use crate::physics::Side;

/// Inputs that pick the gravity for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityInputs {
    pub velocity_y: f32,
    pub spring_launched: bool,
    pub spring_gravity_modifier: f32,
    pub in_apex_window: bool,
    pub fast_falling: bool,
}

/// Gravity for one tick. Later rules override earlier ones: falling, then
/// spring rise, then the apex window; fast falling multiplies whatever won.
pub fn select_gravity(config: &MovementConfig, inputs: GravityInputs) -> f32 {
    let base = config.base_gravity;
    let mut gravity = if inputs.velocity_y < 0.0 {
        base * config.falling_gravity_modifier
    } else if inputs.spring_launched {
        base * inputs.spring_gravity_modifier
    } else {
        base
    };
    if inputs.in_apex_window {
        gravity = base * config.apex_modifier_gravity;
    }
    if inputs.fast_falling {
        gravity *= config.fast_falling_gravity_modifier;
    }
    gravity
}

/// Apply one tick of gravity and the fall speed caps.
pub(crate) fn apply_gravity(state: &mut MovementState, config: &MovementConfig) {
    let fast_falling = state.axes.vertical < 0.0;
    let gravity = select_gravity(
        config,
        GravityInputs {
            velocity_y: state.velocity.y,
            spring_launched: state.spring_launched,
            spring_gravity_modifier: state.spring_gravity_modifier,
            in_apex_window: state.in_apex_window(config),
            fast_falling,
        },
    );
    state.velocity.y -= gravity;

    let terminal = if fast_falling {
        config.fast_terminal_velocity
    } else {
        config.base_terminal_velocity
    };
    state.velocity.y = state.velocity.y.max(terminal);

    // Wall slide: pushing into a wall caps the fall speed
    let horizontal = state.axes.horizontal;
    let sliding = (state.timers.since_left_wall().is_touching() && horizontal < 0.0)
        || (state.timers.since_right_wall().is_touching() && horizontal > 0.0);
    if sliding {
        state.velocity.y = state.velocity.y.max(config.wall_terminal_velocity);
    }
}

/// Air-control factor for this tick.
///
/// Zero (snappy mode) or ramping linearly back to base during the wall-jump
/// lag, base afterwards. Touching the wall opposite the one last jumped from
/// restores full control at once.
pub fn air_friction(
    config: &MovementConfig,
    since_wall_jumped: f32,
    previous_wall: Option<Side>,
    touching_left: bool,
    touching_right: bool,
) -> f32 {
    let base = config.base_air_friction;
    let mut friction = if since_wall_jumped < config.wall_jump_lag {
        if config.hollow_knight_wall_jump {
            0.0
        } else {
            base * (since_wall_jumped / config.wall_jump_lag)
        }
    } else {
        base
    };
    let reached_other_wall = match previous_wall {
        Some(Side::Left) => touching_right,
        Some(Side::Right) => touching_left,
        None => false,
    };
    if reached_other_wall {
        friction = base;
    }
    friction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::input::AxisInput;
    use glam::Vec2;

    fn inputs(velocity_y: f32) -> GravityInputs {
        GravityInputs {
            velocity_y,
            spring_launched: false,
            spring_gravity_modifier: 1.5,
            in_apex_window: false,
            fast_falling: false,
        }
    }

    #[test]
    fn test_gravity_selection_order() {
        let config = MovementConfig::default();
        let base = config.base_gravity;

        assert!((select_gravity(&config, inputs(1.0)) - base).abs() < 1e-6);
        assert!((select_gravity(&config, inputs(-1.0)) - base * 2.0).abs() < 1e-6);

        let spring = GravityInputs { spring_launched: true, ..inputs(1.0) };
        assert!((select_gravity(&config, spring) - base * 1.5).abs() < 1e-6);

        // Falling beats the spring modifier
        let spring_falling = GravityInputs { spring_launched: true, ..inputs(-1.0) };
        assert!((select_gravity(&config, spring_falling) - base * 2.0).abs() < 1e-6);

        // Apex overrides falling
        let apex = GravityInputs { in_apex_window: true, ..inputs(-0.1) };
        assert!((select_gravity(&config, apex) - base * 0.9).abs() < 1e-6);

        // Fast fall stacks on top
        let fast_apex = GravityInputs { fast_falling: true, ..apex };
        assert!((select_gravity(&config, fast_apex) - base * 0.9 * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_velocity_clamps() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        state.velocity.y = -14.9;
        apply_gravity(&mut state, &config);
        assert_eq!(state.velocity.y, config.base_terminal_velocity);

        state.axes = AxisInput::new(0.0, -1.0);
        state.velocity.y = -19.5;
        apply_gravity(&mut state, &config);
        assert_eq!(state.velocity.y, config.fast_terminal_velocity);
    }

    #[test]
    fn test_wall_slide_cap_needs_push() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        state.timers.resnap_contacts(false, false, true);

        state.velocity.y = -10.0;
        apply_gravity(&mut state, &config);
        assert!(state.velocity.y < config.wall_terminal_velocity);

        state.axes = AxisInput::new(1.0, 0.0);
        state.velocity.y = -10.0;
        apply_gravity(&mut state, &config);
        assert_eq!(state.velocity.y, config.wall_terminal_velocity);
    }

    #[test]
    fn test_air_friction_recovery() {
        let config = MovementConfig::default();
        let base = config.base_air_friction;

        assert_eq!(air_friction(&config, 0.0, Some(Side::Right), false, false), 0.0);
        let half = air_friction(&config, config.wall_jump_lag * 0.5, Some(Side::Right), false, false);
        assert!((half - base * 0.5).abs() < 1e-6);
        assert_eq!(air_friction(&config, config.wall_jump_lag, Some(Side::Right), false, false), base);
    }

    #[test]
    fn test_air_friction_hollow_knight() {
        let config = MovementConfig {
            hollow_knight_wall_jump: true,
            ..MovementConfig::default()
        };
        assert_eq!(air_friction(&config, 0.79, Some(Side::Left), false, false), 0.0);
        assert_eq!(air_friction(&config, 0.81, Some(Side::Left), false, false), config.base_air_friction);
    }

    #[test]
    fn test_air_friction_snaps_on_opposite_wall() {
        let config = MovementConfig::default();
        // Jumped off the right wall, now touching the left one
        assert_eq!(
            air_friction(&config, 0.1, Some(Side::Right), true, false),
            config.base_air_friction
        );
        // Back on the same wall: still recovering
        assert!(air_friction(&config, 0.1, Some(Side::Right), false, true) < config.base_air_friction);
    }
}

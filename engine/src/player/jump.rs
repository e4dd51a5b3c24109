//! Jump / Wall-Jump Subsystem
//!
//! Ground jumps with coyote time and buffering, the short-hop cut, wall
//! jumps with a per-wall lockout, and external spring impulses.
//!
//! Each press edge is consumed by whichever of these fires first in the tick
//! order, so one press never produces two jumps.

use glam::Vec2;

use super::config::MovementConfig;
use super::events::MovementEvent;
use super::gravity::air_friction;
use super::movement::MovementState;
use super::state::CharacterState;
use crate::physics::Side;

/// Consume the press edge and push the buffer past its window.
fn consume_jump_input(state: &mut MovementState, config: &MovementConfig) {
    state.jump.consume_press();
    state.timers.poison_jump_buffer(config.jump_buffer_time);
}

/// Ground jump. Returns true if it fired.
///
/// Fires inside the coyote window when a press is pending (or buffered) and
/// the previous jump is older than the lockout. Vertical velocity is set,
/// not added.
pub(crate) fn try_jump(state: &mut MovementState, config: &MovementConfig) -> bool {
    let timers = &state.timers;
    let in_coyote = timers.since_grounded().seconds() < config.coyote_time;
    let wants_jump =
        state.jump.pressed() || timers.since_jump_buffered() < config.jump_buffer_time;
    let unlocked = timers.since_jumped() > config.jump_lockout_time;

    if !(in_coyote && wants_jump && unlocked) {
        return false;
    }

    state.set_state(CharacterState::Airborne);
    state.timers.reset_jumped();
    consume_jump_input(state, config);
    state.velocity.y = config.jump_force;
    state.outbox.push(MovementEvent::Jumped);
    tracing::debug!(
        "jump at {:?} (since_grounded {:.3}s)",
        state.position,
        state.timers.since_grounded().seconds()
    );
    true
}

/// Cut a rising jump short when the button was released early. Returns true
/// if the cut was applied.
///
/// The window is measured from the last ground contact.
pub(crate) fn try_short_hop(state: &mut MovementState, config: &MovementConfig) -> bool {
    if state.timers.since_grounded().seconds() < config.full_hop_time
        && state.jump.released()
        && state.velocity.y > 0.0
        && state.machine.current() == CharacterState::Airborne
    {
        state.jump.consume_release();
        state.velocity.y *= config.short_hop_modifier;
        tracing::debug!("short hop, vy now {:.3}", state.velocity.y);
        true
    } else {
        false
    }
}

/// Wall jump pass, including the air-control update. Returns the launch
/// direction if a wall jump fired.
///
/// When both walls are touched the one the input pushes into is tried first;
/// with neutral input the right wall is.
pub(crate) fn handle_wall_jump(state: &mut MovementState, config: &MovementConfig) -> Option<Side> {
    if state.timers.since_grounded().is_touching() {
        state.previous_wall = None;
    }

    let walls = if state.axes.horizontal < 0.0 {
        [Side::Left, Side::Right]
    } else {
        [Side::Right, Side::Left]
    };

    let mut launched = None;
    for wall in walls {
        let touching = match wall {
            Side::Left => state.timers.since_left_wall().is_touching(),
            Side::Right => state.timers.since_right_wall().is_touching(),
        };
        let allowed = state.timers.since_wall_jumped() > config.wall_jump_lag
            || state.previous_wall != Some(wall);
        if touching && state.jump.pressed() && allowed {
            let direction = wall.opposite();
            wall_jump(state, config, wall, direction);
            launched = Some(direction);
            break;
        }
    }

    state.air_friction = air_friction(
        config,
        state.timers.since_wall_jumped(),
        state.previous_wall,
        state.timers.since_left_wall().is_touching(),
        state.timers.since_right_wall().is_touching(),
    );

    launched
}

fn wall_jump(state: &mut MovementState, config: &MovementConfig, wall: Side, direction: Side) {
    state.set_state(CharacterState::Airborne);
    state.timers.reset_wall_jumped();
    state.previous_wall = Some(wall);
    consume_jump_input(state, config);

    let impulse = Vec2::new(
        config.move_speed * direction.sign() * config.wall_jump_speed_boost,
        config.jump_force * config.wall_jump_force_multiplier,
    );
    if config.limit_wall_jump_vertical {
        state.velocity = impulse;
    } else {
        state.velocity += impulse;
    }

    state.outbox.push(MovementEvent::WallJumped { direction });
    tracing::debug!("wall jump off {:?} wall, velocity {:?}", wall, state.velocity);
}

/// Spring launch. Adds `impulse`, plus a jump boost if jump is held or
/// buffered, and switches rising gravity to `gravity_modifier` until the
/// next apex.
pub(crate) fn apply_spring(
    state: &mut MovementState,
    config: &MovementConfig,
    impulse: Vec2,
    jump_force_modifier: f32,
    gravity_modifier: f32,
) {
    state.spring_gravity_modifier = gravity_modifier;
    state.velocity += impulse;
    if state.jump.held() || state.timers.since_jump_buffered() < config.jump_buffer_time {
        state.velocity.y += config.jump_force * jump_force_modifier;
        consume_jump_input(state, config);
    }
    state.spring_launched = true;
    state.outbox.push(MovementEvent::SpringLaunched);
    tracing::debug!("spring launch, velocity {:?}", state.velocity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::input::{AxisInput, JumpEdge};

    const DT: f32 = 0.02;

    fn grounded(config: &MovementConfig) -> MovementState {
        let mut state = MovementState::new(config, Vec2::ZERO);
        state.timers.advance(DT);
        state.timers.resnap_contacts(true, false, false);
        state.set_state(CharacterState::Grounded);
        state.outbox.clear();
        state
    }

    fn airborne_for(config: &MovementConfig, seconds: f32) -> MovementState {
        let mut state = grounded(config);
        state.set_state(CharacterState::Airborne);
        state.timers.advance(seconds);
        state.timers.resnap_contacts(false, false, false);
        state
    }

    #[test]
    fn test_jump_sets_velocity_and_consumes_press() {
        let config = MovementConfig::default();
        let mut state = grounded(&config);
        state.velocity.y = -0.5;
        state.jump.set_edge(true);

        assert!(try_jump(&mut state, &config));
        assert_eq!(state.velocity.y, config.jump_force);
        assert_eq!(state.state(), CharacterState::Airborne);
        assert!(!state.jump.pressed());
        assert!(state.timers.since_jump_buffered() > config.jump_buffer_time);
        assert_eq!(state.outbox, vec![MovementEvent::Jumped]);

        // Same edge can't fire twice
        assert!(!try_jump(&mut state, &config));
    }

    #[test]
    fn test_coyote_boundary_is_strict() {
        let config = MovementConfig::default();

        let mut inside = airborne_for(&config, config.coyote_time - 0.001);
        inside.jump.set_edge(true);
        assert!(try_jump(&mut inside, &config));

        let mut at_edge = airborne_for(&config, config.coyote_time);
        at_edge.jump.set_edge(true);
        assert!(!try_jump(&mut at_edge, &config));
    }

    #[test]
    fn test_lockout_blocks_rejump() {
        let config = MovementConfig::default();
        let mut state = grounded(&config);
        state.jump.set_edge(true);
        assert!(try_jump(&mut state, &config));

        state.timers.advance(config.jump_lockout_time * 0.5);
        state.timers.resnap_contacts(true, false, false);
        state.jump.set_edge(true);
        assert!(!try_jump(&mut state, &config));
    }

    #[test]
    fn test_buffered_jump_fires_without_press() {
        let config = MovementConfig::default();
        let mut state = grounded(&config);
        state.timers.start_jump_buffer();
        state.timers.advance(config.jump_buffer_time - 0.01);
        state.timers.resnap_contacts(true, false, false);

        assert!(try_jump(&mut state, &config));
    }

    #[test]
    fn test_short_hop_halves_once() {
        let config = MovementConfig::default();
        let mut state = airborne_for(&config, 0.1);
        state.velocity.y = 10.0;
        state.jump.set_edge(true);
        state.jump.set_edge(false);

        assert!(try_short_hop(&mut state, &config));
        assert!((state.velocity.y - 10.0 * config.short_hop_modifier).abs() < 1e-6);
        assert!(!try_short_hop(&mut state, &config));
        assert!((state.velocity.y - 10.0 * config.short_hop_modifier).abs() < 1e-6);
    }

    #[test]
    fn test_late_release_keeps_height() {
        let config = MovementConfig::default();
        let mut state = airborne_for(&config, config.full_hop_time + 0.01);
        state.velocity.y = 4.0;
        state.jump.set_edge(false);

        assert!(!try_short_hop(&mut state, &config));
        assert_eq!(state.velocity.y, 4.0);
    }

    fn on_wall(config: &MovementConfig, left: bool, right: bool) -> MovementState {
        let mut state = airborne_for(config, 1.0);
        state.timers.advance(DT);
        state.timers.resnap_contacts(false, left, right);
        state
    }

    #[test]
    fn test_wall_jump_off_right_wall_additive() {
        let config = MovementConfig::default();
        let mut state = on_wall(&config, false, true);
        state.velocity = Vec2::new(0.5, -2.0);
        state.jump.set_edge(true);

        assert_eq!(handle_wall_jump(&mut state, &config), Some(Side::Left));
        let expected = Vec2::new(0.5 - 5.0 * 1.2, -2.0 + 15.0 * 0.8);
        assert!((state.velocity - expected).length() < 1e-5);
        assert_eq!(state.previous_wall, Some(Side::Right));
        assert_eq!(state.air_friction, 0.0);
        assert!(!state.jump.pressed());
    }

    #[test]
    fn test_wall_jump_limited_sets_velocity() {
        let config = MovementConfig {
            limit_wall_jump_vertical: true,
            ..MovementConfig::default()
        };
        let mut state = on_wall(&config, false, true);
        state.velocity = Vec2::new(0.5, -2.0);
        state.jump.set_edge(true);

        handle_wall_jump(&mut state, &config);
        assert!((state.velocity - Vec2::new(-6.0, 12.0)).length() < 1e-5);
    }

    #[test]
    fn test_same_wall_locked_during_lag() {
        let config = MovementConfig::default();
        let mut state = on_wall(&config, false, true);
        state.jump.set_edge(true);
        assert!(handle_wall_jump(&mut state, &config).is_some());

        state.timers.advance(config.wall_jump_lag * 0.5);
        state.timers.resnap_contacts(false, false, true);
        state.jump.set_edge(true);
        assert_eq!(handle_wall_jump(&mut state, &config), None);
        // Press stays pending
        assert!(state.jump.pressed());

        // Opposite wall is always allowed
        state.timers.advance(DT);
        state.timers.resnap_contacts(false, true, false);
        assert_eq!(handle_wall_jump(&mut state, &config), Some(Side::Right));
    }

    #[test]
    fn test_ground_contact_resets_previous_wall() {
        let config = MovementConfig::default();
        let mut state = on_wall(&config, false, true);
        state.jump.set_edge(true);
        handle_wall_jump(&mut state, &config);

        state.timers.advance(DT);
        state.timers.resnap_contacts(true, false, true);
        state.jump.set_edge(true);
        assert_eq!(handle_wall_jump(&mut state, &config), Some(Side::Left));
    }

    #[test]
    fn test_corridor_prefers_input_wall() {
        let config = MovementConfig::default();

        let mut neutral = on_wall(&config, true, true);
        neutral.jump.set_edge(true);
        assert_eq!(handle_wall_jump(&mut neutral, &config), Some(Side::Left));

        let mut pushing_left = on_wall(&config, true, true);
        pushing_left.axes = AxisInput::new(-1.0, 0.0);
        pushing_left.jump.set_edge(true);
        assert_eq!(handle_wall_jump(&mut pushing_left, &config), Some(Side::Right));
        assert_eq!(pushing_left.outbox.len(), 1);
    }

    #[test]
    fn test_spring_with_held_jump() {
        let config = MovementConfig::default();
        let mut state = airborne_for(&config, 1.0);
        state.jump.set_edge(true);

        apply_spring(&mut state, &config, Vec2::new(0.0, 20.0), 0.5, 1.2);

        assert!((state.velocity.y - (20.0 + 15.0 * 0.5)).abs() < 1e-5);
        assert!(state.spring_launched);
        assert_eq!(state.spring_gravity_modifier, 1.2);
        assert!(!state.jump.pressed());
        assert_eq!(state.outbox.last(), Some(&MovementEvent::SpringLaunched));
    }

    #[test]
    fn test_spring_with_buffered_tap() {
        let config = MovementConfig::default();
        let mut state = airborne_for(&config, 1.0);
        state.jump.set_edge(true);
        if state.jump.set_edge(false) == JumpEdge::ReleasedUnconsumed {
            state.timers.start_jump_buffer();
        }
        state.timers.advance(DT);
        assert!(!state.jump.held());
        assert!(state.timers.since_jump_buffered() < config.jump_buffer_time);

        apply_spring(&mut state, &config, Vec2::new(0.0, 20.0), 0.5, 1.0);

        assert!((state.velocity.y - (20.0 + config.jump_force * 0.5)).abs() < 1e-5);
        assert!(state.timers.since_jump_buffered() > config.jump_buffer_time);

        // The tap is spent
        apply_spring(&mut state, &config, Vec2::new(0.0, 20.0), 0.5, 1.0);
        assert!((state.velocity.y - (40.0 + config.jump_force * 0.5)).abs() < 1e-4);
    }

    #[test]
    fn test_spring_without_jump() {
        let config = MovementConfig::default();
        let mut state = airborne_for(&config, 1.0);
        apply_spring(&mut state, &config, Vec2::new(3.0, 20.0), 0.5, 1.2);
        assert!((state.velocity - Vec2::new(3.0, 20.0)).length() < 1e-5);
    }
}

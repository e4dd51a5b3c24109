//! Movement state and horizontal integration
//!
//! [`MovementState`] is everything one character carries between ticks. The
//! passes in this module and its siblings (`gravity`, `jump`, `corners`)
//! each read and write it in the fixed per-tick order driven by the
//! controller.

use glam::Vec2;

use super::config::MovementConfig;
use super::events::MovementEvent;
use super::input::{AxisInput, JumpInput};
use super::state::{CharacterState, StateMachine};
use super::timers::TimerBank;
use crate::physics::Side;

/// Below this target speed the integrator decelerates instead of
/// accelerating.
pub const TARGET_SPEED_EPSILON: f32 = 0.01;

/// Grounded speeds below this snap to zero when input is neutral.
pub const STOP_SPEED: f32 = 0.05;

/// Per-character simulation state.
#[derive(Debug, Clone)]
pub struct MovementState {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    /// Vertical velocity recorded by the previous apex check
    pub(crate) previous_velocity_y: f32,
    pub(crate) axes: AxisInput,
    pub(crate) jump: JumpInput,
    pub(crate) timers: TimerBank,
    pub(crate) machine: StateMachine,
    /// Wall the last wall jump pushed off from; cleared on the ground
    pub(crate) previous_wall: Option<Side>,
    /// Current air-control factor
    pub(crate) air_friction: f32,
    pub(crate) spring_launched: bool,
    /// Gravity multiplier while rising off the last spring
    pub(crate) spring_gravity_modifier: f32,
    pub(crate) respawn_point: Vec2,
    pub(crate) dead: bool,
    pub(crate) paused: bool,
    pub(crate) tick: u64,
    /// Events produced during the current tick, flushed by the controller
    pub(crate) outbox: Vec<MovementEvent>,
}

impl MovementState {
    /// Fresh state at `position`, airborne and at rest.
    pub fn new(config: &MovementConfig, position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            previous_velocity_y: 0.0,
            axes: AxisInput::default(),
            jump: JumpInput::new(),
            timers: TimerBank::new(),
            machine: StateMachine::new(),
            previous_wall: None,
            air_friction: config.base_air_friction,
            spring_launched: false,
            spring_gravity_modifier: config.spring_gravity_modifier,
            respawn_point: position,
            dead: false,
            paused: false,
            tick: 0,
            outbox: Vec::new(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn state(&self) -> CharacterState {
        self.machine.current()
    }

    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    pub fn axes(&self) -> AxisInput {
        self.axes
    }

    pub fn jump(&self) -> &JumpInput {
        &self.jump
    }

    pub fn previous_wall(&self) -> Option<Side> {
        self.previous_wall
    }

    pub fn air_friction(&self) -> f32 {
        self.air_friction
    }

    pub fn is_spring_launched(&self) -> bool {
        self.spring_launched
    }

    /// Move the state machine, collecting hook events into the outbox.
    pub(crate) fn set_state(&mut self, to: CharacterState) {
        self.machine.transition(to, &mut self.outbox);
    }

    /// Whether the apex window is open.
    pub(crate) fn in_apex_window(&self, config: &MovementConfig) -> bool {
        self.timers.since_apex() < config.apex_modifier_duration
    }

    /// All numeric state is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.previous_velocity_y.is_finite()
            && self.air_friction.is_finite()
            && self.timers.is_sane()
    }
}

/// Linear interpolation, unclamped.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Blend horizontal velocity toward the input target speed.
///
/// Grounded blends at the raw rate and snaps tiny speeds to zero when input
/// is neutral. Airborne scales the rate by the air-control factor (and the
/// apex speed bonus inside the apex window). Climb and Dash leave horizontal
/// velocity alone.
pub(crate) fn integrate_horizontal(state: &mut MovementState, config: &MovementConfig) {
    let horizontal = state.axes.horizontal;
    let target = horizontal * config.move_speed;
    let mut rate = if target.abs() > TARGET_SPEED_EPSILON {
        config.acceleration
    } else {
        config.deceleration
    };

    match state.machine.current() {
        CharacterState::Grounded => {
            state.velocity.x = lerp(state.velocity.x, target, rate);
            if state.velocity.x.abs() < STOP_SPEED && horizontal == 0.0 {
                state.velocity.x = 0.0;
            }
        }
        CharacterState::Airborne => {
            if state.in_apex_window(config) {
                rate *= config.apex_modifier_speed;
            }
            state.velocity.x = lerp(state.velocity.x, target, rate * state.air_friction);
        }
        CharacterState::Climb | CharacterState::Dash => {}
    }
}

/// Open the apex window on the tick vertical velocity stops rising.
pub(crate) fn detect_apex(state: &mut MovementState) {
    if state.previous_velocity_y > 0.0 && state.velocity.y <= 0.0 {
        state.timers.reset_apex();
        state.spring_launched = false;
    }
    state.previous_velocity_y = state.velocity.y;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_state(config: &MovementConfig) -> MovementState {
        let mut state = MovementState::new(config, Vec2::ZERO);
        state.set_state(CharacterState::Grounded);
        state
    }

    #[test]
    fn test_grounded_acceleration_one_tick() {
        let config = MovementConfig::default();
        let mut state = grounded_state(&config);
        state.axes = AxisInput::new(1.0, 0.0);

        integrate_horizontal(&mut state, &config);

        let expected = lerp(0.0, 5.0, config.acceleration);
        assert!((state.velocity.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_grounded_stop_snap() {
        let config = MovementConfig::default();
        let mut state = grounded_state(&config);
        state.velocity.x = 0.05;

        integrate_horizontal(&mut state, &config);
        // 0.05 * (1 - 0.05) = 0.0475 < STOP_SPEED
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn test_no_snap_while_holding_input() {
        let config = MovementConfig::default();
        let mut state = grounded_state(&config);
        state.axes = AxisInput::new(0.001, 0.0);

        integrate_horizontal(&mut state, &config);
        assert!(state.velocity.x > 0.0);
    }

    #[test]
    fn test_airborne_uses_air_friction() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        state.axes = AxisInput::new(1.0, 0.0);

        integrate_horizontal(&mut state, &config);

        let expected = lerp(0.0, 5.0, config.acceleration * config.base_air_friction);
        assert!((state.velocity.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_apex_window_boosts_air_control() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        state.axes = AxisInput::new(-1.0, 0.0);
        state.timers.reset_apex();

        integrate_horizontal(&mut state, &config);

        let rate = config.acceleration * config.apex_modifier_speed * config.base_air_friction;
        assert!((state.velocity.x - lerp(0.0, -5.0, rate)).abs() < 1e-6);
    }

    #[test]
    fn test_climb_and_dash_skip_integration() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        state.axes = AxisInput::new(1.0, 0.0);
        state.velocity.x = 2.0;
        state.set_state(CharacterState::Dash);

        integrate_horizontal(&mut state, &config);
        assert_eq!(state.velocity.x, 2.0);
    }

    #[test]
    fn test_apex_on_sign_flip() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        state.spring_launched = true;

        state.velocity.y = 0.4;
        detect_apex(&mut state);
        assert!(state.timers.since_apex() > 1.0);

        state.velocity.y = -0.35;
        detect_apex(&mut state);
        assert_eq!(state.timers.since_apex(), 0.0);
        assert!(!state.spring_launched);
    }

    #[test]
    fn test_apex_not_while_resting() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config, Vec2::ZERO);
        detect_apex(&mut state);
        state.velocity.y = -0.75;
        detect_apex(&mut state);
        assert!(state.timers.since_apex() > 1.0);
    }
}

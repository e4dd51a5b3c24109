//! Character Movement Controller
//!
//! Drives one platformer character through a fixed per-tick pass chain:
//!
//! 1. Timer bank advance, then contact re-snap from fresh probes
//! 2. State machine re-evaluation
//! 3. Horizontal integration
//! 4. Jump and short hop
//! 5. Gravity
//! 6. Corner / edge correction
//! 7. Apex detection
//! 8. Respawn zone collection
//! 9. Wall jump and air-control update
//! 10. State `update` hook
//! 11. Kinematic body step against the world
//!
//! The order is load-bearing: a press edge is consumed by the first pass
//! that uses it, and later passes see the velocity earlier ones produced.
//!
//! # Usage
//!
//! ```
//! use feel_engine::physics::{Aabb, TileWorld, Vec2};
//! use feel_engine::player::{CharacterController, MovementConfig};
//!
//! let mut world = TileWorld::new();
//! world.add_solid(Aabb::new(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0)));
//!
//! let config = MovementConfig::default();
//! let dt = config.fixed_timestep;
//! let mut controller = CharacterController::new(config, Vec2::new(0.0, 2.0));
//!
//! // Each fixed tick:
//! controller.set_movement_input(1.0, 0.0);
//! controller.tick(dt, &world);
//! let position = controller.position();
//! # assert!(position.x > 0.0);
//! ```

use glam::Vec2;

use super::config::MovementConfig;
use super::corners::correct_corners;
use super::events::{CharacterEvent, CharacterId, EventDispatcher, MovementEvent};
use super::gravity::apply_gravity;
use super::input::{AxisInput, JumpEdge};
use super::jump::{apply_spring, handle_wall_jump, try_jump, try_short_hop};
use super::movement::{MovementState, detect_apex, integrate_horizontal};
use super::state::CharacterState;
use super::timers::TimerBank;
use crate::physics::{Aabb, CollisionQuery, Side};

/// Horizontal speed below which a character with no input counts as idle.
pub const IDLE_SPEED: f32 = 0.02;

/// Platformer character controller.
///
/// Owns the character's [`MovementState`] and publishes its events on the
/// [`EventDispatcher`] it was built with. Geometry comes in per tick through
/// a [`CollisionQuery`].
#[derive(Debug, Clone)]
pub struct CharacterController {
    id: CharacterId,
    config: MovementConfig,
    state: MovementState,
    dispatcher: EventDispatcher,
}

static_assertions::assert_impl_all!(CharacterController: Send);

impl CharacterController {
    /// Create a controller at `spawn` with its own dispatcher.
    pub fn new(config: MovementConfig, spawn: Vec2) -> Self {
        Self::with_dispatcher(CharacterId::default(), config, spawn, EventDispatcher::new())
    }

    /// Create a controller that publishes on a shared dispatcher.
    ///
    /// # Arguments
    /// * `id` - Identity stamped on every event
    /// * `config` - Movement constants, fixed for the controller's lifetime
    /// * `spawn` - Initial position and respawn point
    /// * `dispatcher` - Where events go
    pub fn with_dispatcher(
        id: CharacterId,
        config: MovementConfig,
        spawn: Vec2,
        dispatcher: EventDispatcher,
    ) -> Self {
        let state = MovementState::new(&config, spawn);
        Self {
            id,
            config,
            state,
            dispatcher,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn position(&self) -> Vec2 {
        self.state.position()
    }

    pub fn velocity(&self) -> Vec2 {
        self.state.velocity()
    }

    pub fn state(&self) -> CharacterState {
        self.state.state()
    }

    pub fn is_dead(&self) -> bool {
        self.state.dead
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn timers(&self) -> &TimerBank {
        self.state.timers()
    }

    /// Full per-character state, read-only.
    pub fn movement(&self) -> &MovementState {
        &self.state
    }

    /// Number of ticks simulated so far.
    pub fn tick_count(&self) -> u64 {
        self.state.tick
    }

    pub fn respawn_point(&self) -> Vec2 {
        self.state.respawn_point
    }

    /// World-space collision box.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.state.position, self.config.body_size)
    }

    /// Nothing is being attempted: no pending press, neutral axes, and
    /// essentially no horizontal speed.
    pub fn is_idle(&self) -> bool {
        !self.state.jump.pressed()
            && self.state.axes.is_neutral()
            && self.state.velocity.x.abs() < IDLE_SPEED
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Set the analog movement axes. Values are clamped to [-1, 1] and NaN
    /// reads as 0.
    pub fn set_movement_input(&mut self, horizontal: f32, vertical: f32) {
        self.state.axes = AxisInput::new(horizontal, vertical);
    }

    /// Record a jump button edge.
    ///
    /// Releasing before the press was used starts the jump buffer, so a tap
    /// just before landing still jumps.
    pub fn set_jump_edge(&mut self, pressed: bool) {
        if self.state.jump.set_edge(pressed) == JumpEdge::ReleasedUnconsumed {
            self.state.timers.start_jump_buffer();
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.state.paused == paused {
            return;
        }
        self.state.paused = paused;
        tracing::info!("character {} {}", self.id.0, if paused { "paused" } else { "resumed" });
        self.emit(MovementEvent::PauseChanged { paused });
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.state.paused);
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance one fixed tick. Returns false if the tick was skipped (bad
    /// `dt`, paused or dead).
    pub fn tick<W: CollisionQuery + ?Sized>(&mut self, dt: f32, world: &W) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            tracing::warn!("skipping tick with invalid dt {}", dt);
            return false;
        }
        if self.state.paused || self.state.dead {
            return false;
        }

        let config = &self.config;
        let state = &mut self.state;
        state.tick += 1;

        // Timers first, then contacts from this tick's geometry
        state.timers.advance(dt);
        let size = config.body_size;
        let grounded = world.is_grounded_below(state.position, size);
        let left_wall = world.is_wall_contact(state.position, size, Side::Left);
        let right_wall = world.is_wall_contact(state.position, size, Side::Right);
        state.timers.resnap_contacts(grounded, left_wall, right_wall);

        let next = state
            .machine
            .evaluate(grounded, state.timers.since_jumped(), state.velocity.y);
        state.set_state(next);

        integrate_horizontal(state, config);
        try_jump(state, config);
        try_short_hop(state, config);
        apply_gravity(state, config);
        correct_corners(state, config, world, dt);
        detect_apex(state);
        collect_respawn_zone(state, config, world);
        handle_wall_jump(state, config);
        state.machine.update(&mut state.outbox);

        body_step(state, config, world, dt);

        debug_assert!(state.is_finite(), "non-finite movement state: {state:?}");
        self.flush_events();
        true
    }

    /// Spring / external impulse.
    ///
    /// # Arguments
    /// * `impulse` - Velocity added by the spring
    /// * `jump_force_modifier` - Fraction of `jump_force` added if jump is held or buffered
    /// * `gravity_modifier` - Rising gravity multiplier until the next apex
    pub fn apply_spring(&mut self, impulse: Vec2, jump_force_modifier: f32, gravity_modifier: f32) {
        apply_spring(&mut self.state, &self.config, impulse, jump_force_modifier, gravity_modifier);
        self.flush_events();
    }

    /// Move the character with a platform it stands on.
    pub fn carry(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.state.position += delta;
        }
    }

    // ------------------------------------------------------------------
    // Respawn handshake: die -> go_to_respawn_point -> respawn_finished
    // ------------------------------------------------------------------

    /// First respawn phase: stop and mark dead. Ignored if already dead.
    pub fn die(&mut self) {
        if self.state.dead {
            return;
        }
        self.state.velocity = Vec2::ZERO;
        self.state.dead = true;
        tracing::info!("character {} died at {:?}", self.id.0, self.state.position);
        self.emit(MovementEvent::Died);
    }

    /// Second respawn phase: teleport to `point` with zero velocity.
    pub fn go_to_respawn_point(&mut self, point: Vec2) {
        if !self.state.dead {
            tracing::warn!("character {} teleported to respawn while alive", self.id.0);
        }
        self.state.position = point;
        self.state.velocity = Vec2::ZERO;
        self.state.previous_velocity_y = 0.0;
    }

    /// Final respawn phase: resume simulation.
    pub fn respawn_finished(&mut self) {
        self.state.dead = false;
        tracing::info!("character {} respawned at {:?}", self.id.0, self.state.position);
    }

    /// Override the respawn point (level start, checkpoints set by script).
    pub fn set_respawn_point(&mut self, point: Vec2) {
        self.state.respawn_point = point;
    }

    fn emit(&mut self, event: MovementEvent) {
        self.state.outbox.push(event);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        for event in self.state.outbox.drain(..) {
            self.dispatcher.publish(CharacterEvent {
                character: self.id,
                tick: self.state.tick,
                event,
            });
        }
    }
}

/// Move the respawn point when a respawn zone sits just above the body
/// center.
fn collect_respawn_zone<W: CollisionQuery + ?Sized>(
    state: &mut MovementState,
    config: &MovementConfig,
    world: &W,
) {
    let Some(point) = world.raycast_respawn(state.position, Vec2::Y, config.edge_detection_range)
    else {
        return;
    };
    if point != state.respawn_point {
        state.respawn_point = point;
        state.outbox.push(MovementEvent::RespawnZoneEntered { point });
        tracing::info!("respawn point moved to {:?}", point);
    }
}

/// Integrate position against solid geometry. A blocked axis loses its
/// velocity.
fn body_step<W: CollisionQuery + ?Sized>(
    state: &mut MovementState,
    config: &MovementConfig,
    world: &W,
    dt: f32,
) {
    let body = Aabb::from_center_size(state.position, config.body_size);
    let sweep = world.move_and_collide(body, state.velocity * dt);
    state.position += sweep.motion;
    if sweep.blocked_x {
        state.velocity.x = 0.0;
    }
    if sweep.blocked_y {
        state.velocity.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{SKIN, TileWorld};

    const DT: f32 = 0.02;

    fn floor_world() -> TileWorld {
        let mut world = TileWorld::new();
        world.add_solid(Aabb::new(Vec2::new(-50.0, -1.0), Vec2::new(50.0, 0.0)));
        world
    }

    fn standing(world: &TileWorld) -> CharacterController {
        let mut controller = CharacterController::new(MovementConfig::default(), Vec2::new(0.0, 0.5 + SKIN));
        controller.tick(DT, world);
        controller
    }

    #[test]
    fn test_fresh_controller() {
        let controller = CharacterController::new(MovementConfig::default(), Vec2::new(1.0, 2.0));
        assert_eq!(controller.state(), CharacterState::Airborne);
        assert_eq!(controller.position(), Vec2::new(1.0, 2.0));
        assert_eq!(controller.respawn_point(), Vec2::new(1.0, 2.0));
        assert!(!controller.is_dead());
        assert!(controller.is_idle());
    }

    #[test]
    fn test_settles_grounded_on_floor() {
        let world = floor_world();
        let controller = standing(&world);
        assert_eq!(controller.state(), CharacterState::Grounded);
        assert_eq!(controller.velocity(), Vec2::ZERO);
        assert!((controller.position().y - (0.5 + SKIN)).abs() < 1e-6);
    }

    #[test]
    fn test_one_tick_of_running() {
        let world = floor_world();
        let mut controller = standing(&world);
        controller.set_movement_input(1.0, 0.0);
        controller.tick(DT, &world);

        let config = MovementConfig::default();
        assert!((controller.velocity().x - config.move_speed * config.acceleration).abs() < 1e-6);
    }

    #[test]
    fn test_falls_in_empty_world() {
        let world = TileWorld::new();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec2::ZERO);
        for _ in 0..200 {
            controller.tick(DT, &world);
        }
        assert_eq!(controller.velocity().y, MovementConfig::default().base_terminal_velocity);
        assert!(controller.movement().is_finite());
    }

    #[test]
    fn test_bad_dt_is_skipped() {
        let world = floor_world();
        let mut controller = standing(&world);
        let before = controller.tick_count();
        assert!(!controller.tick(f32::NAN, &world));
        assert!(!controller.tick(0.0, &world));
        assert!(!controller.tick(-DT, &world));
        assert_eq!(controller.tick_count(), before);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let world = TileWorld::new();
        let mut controller = CharacterController::new(MovementConfig::default(), Vec2::ZERO);
        let events = controller.dispatcher().subscribe();
        controller.tick(DT, &world);
        let position = controller.position();
        let ticks = controller.tick_count();

        controller.toggle_pause();
        assert!(!controller.tick(DT, &world));
        assert_eq!(controller.position(), position);
        assert_eq!(controller.tick_count(), ticks);

        controller.set_paused(true);
        controller.toggle_pause();
        let pauses: Vec<_> = events
            .try_iter()
            .filter_map(|e| match e.event {
                MovementEvent::PauseChanged { paused } => Some(paused),
                _ => None,
            })
            .collect();
        assert_eq!(pauses, vec![true, false]);
    }

    #[test]
    fn test_respawn_handshake() {
        let world = floor_world();
        let mut controller = standing(&world);
        controller.set_movement_input(1.0, 0.0);
        controller.tick(DT, &world);

        controller.die();
        assert!(controller.is_dead());
        assert_eq!(controller.velocity(), Vec2::ZERO);
        assert!(!controller.tick(DT, &world));

        controller.go_to_respawn_point(Vec2::new(-3.0, 0.5 + SKIN));
        assert!(controller.is_dead());
        assert_eq!(controller.position(), Vec2::new(-3.0, 0.5 + SKIN));

        controller.respawn_finished();
        assert!(!controller.is_dead());
        assert!(controller.tick(DT, &world));
    }

    #[test]
    fn test_carry_moves_position() {
        let world = floor_world();
        let mut controller = standing(&world);
        controller.carry(Vec2::new(0.25, 0.0));
        assert!((controller.position().x - 0.25).abs() < 1e-6);
        controller.carry(Vec2::new(f32::NAN, 0.0));
        assert!((controller.position().x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_idle_requires_no_pending_press() {
        let world = floor_world();
        let mut controller = standing(&world);
        assert!(controller.is_idle());
        controller.set_jump_edge(true);
        assert!(!controller.is_idle());
    }

    #[test]
    fn test_idle_requires_neutral_axes() {
        let world = floor_world();
        let mut controller = standing(&world);
        controller.set_movement_input(0.0, -1.0);
        assert!(!controller.is_idle());
        controller.set_movement_input(0.0, 0.0);
        assert!(controller.is_idle());
    }
}

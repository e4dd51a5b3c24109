//! Platformer Scene
//!
//! Owns a level ([`TileWorld`] plus platforms, springs and a room) and one
//! character, and steps them on a fixed timestep. Real frame deltas go
//! through an accumulator; each fixed step runs:
//!
//! 1. Moving platforms (carrying a live character that stands on them)
//! 2. Character tick
//! 3. Spring contacts
//! 4. Room exit check (leaving the room kills)
//! 5. Respawn sequencer
//! 6. Replay recording
//!
//! Pausing the character freezes steps 1 to 5.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::replay::Replay;
use super::script::InputScript;
use crate::physics::TileWorld;
use crate::player::{CharacterController, CharacterState};
use crate::world::{MovingPlatform, PlatformSpec, RoomBounds, SpringPad, SpringSpec};

/// Upper bound on fixed steps per frame before the accumulator drops time.
const MAX_FIXED_STEPS_PER_FRAME: usize = 8;

/// Largest frame delta accepted (seconds).
const MAX_FRAME_DELTA_S: f32 = 0.1;

/// Scene settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Leaving this room kills the character
    pub room: RoomBounds,
    /// Time between death and the screen starting to cover (seconds)
    pub death_pause: f32,
    /// Time for the screen to cover before the teleport (seconds)
    pub cover_time: f32,
    /// Time for the screen to clear after the teleport (seconds)
    pub reveal_time: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            room: RoomBounds::default(),
            death_pause: 0.2,
            cover_time: 0.5,
            reveal_time: 0.5,
        }
    }
}

/// Where the respawn sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RespawnPhase {
    #[default]
    Alive,
    /// Dead, waiting for the screen to cover
    Covering,
    /// Teleported, waiting for the screen to clear
    Revealing,
}

/// Drives Die -> GoToRespawnPoint -> RespawnFinished with timing only.
#[derive(Debug, Clone, Default)]
pub struct RespawnSequencer {
    phase: RespawnPhase,
    remaining: f32,
}

impl RespawnSequencer {
    pub fn phase(&self) -> RespawnPhase {
        self.phase
    }

    /// Begin a sequence for a character that just died.
    pub fn start(&mut self, config: &SceneConfig) {
        self.phase = RespawnPhase::Covering;
        self.remaining = config.death_pause + config.cover_time;
    }

    /// Advance the sequence and call the matching controller phase when a
    /// timer runs out.
    pub fn advance(&mut self, dt: f32, config: &SceneConfig, controller: &mut CharacterController) {
        if self.phase == RespawnPhase::Alive {
            return;
        }
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return;
        }
        match self.phase {
            RespawnPhase::Covering => {
                controller.go_to_respawn_point(controller.respawn_point());
                self.phase = RespawnPhase::Revealing;
                self.remaining = config.reveal_time;
            }
            RespawnPhase::Revealing => {
                controller.respawn_finished();
                self.phase = RespawnPhase::Alive;
                self.remaining = 0.0;
            }
            RespawnPhase::Alive => {}
        }
    }
}

/// Fixed-timestep level harness around one character.
#[derive(Debug)]
pub struct PlatformerScene {
    config: SceneConfig,
    world: TileWorld,
    controller: CharacterController,
    platforms: Vec<MovingPlatform>,
    springs: Vec<SpringPad>,
    sequencer: RespawnSequencer,
    accumulator_s: f32,
    steps: u64,
    replay: Option<Replay>,
}

impl PlatformerScene {
    pub fn new(config: SceneConfig, world: TileWorld, controller: CharacterController) -> Self {
        Self {
            config,
            world,
            controller,
            platforms: Vec::new(),
            springs: Vec::new(),
            sequencer: RespawnSequencer::default(),
            accumulator_s: 0.0,
            steps: 0,
            replay: None,
        }
    }

    pub fn add_platform(&mut self, spec: PlatformSpec) -> &MovingPlatform {
        let index = self.platforms.len();
        self.platforms.push(MovingPlatform::spawn(&mut self.world, spec));
        &self.platforms[index]
    }

    pub fn add_spring(&mut self, spec: SpringSpec) {
        self.springs.push(SpringPad::new(spec));
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn world(&self) -> &TileWorld {
        &self.world
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CharacterController {
        &mut self.controller
    }

    pub fn platforms(&self) -> &[MovingPlatform] {
        &self.platforms
    }

    pub fn respawn_phase(&self) -> RespawnPhase {
        self.sequencer.phase()
    }

    /// Fixed steps run so far (including steps spent dead).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.controller.config().fixed_timestep
    }

    /// Start recording a snapshot after every step.
    pub fn start_recording(&mut self) {
        self.replay = Some(Replay::new(self.fixed_timestep()));
    }

    /// Stop recording and hand back what was recorded.
    pub fn take_replay(&mut self) -> Option<Replay> {
        self.replay.take()
    }

    /// Per-frame update. Returns the number of fixed steps run.
    pub fn update(&mut self, frame_delta: f32) -> usize {
        let step_s = self.fixed_timestep();
        let delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, MAX_FRAME_DELTA_S)
        } else {
            0.0
        };
        self.accumulator_s =
            (self.accumulator_s + delta).min(step_s * MAX_FIXED_STEPS_PER_FRAME as f32);

        let mut steps = 0usize;
        while self.accumulator_s >= step_s && steps < MAX_FIXED_STEPS_PER_FRAME {
            self.step();
            self.accumulator_s -= step_s;
            steps += 1;
        }
        steps
    }

    /// Run one fixed step. While paused the level is frozen: only the
    /// replay records and the step counter advances.
    pub fn step(&mut self) {
        if !self.controller.is_paused() {
            let dt = self.fixed_timestep();
            self.simulate(dt);
        }

        // 6. Replay
        if let Some(replay) = &mut self.replay {
            replay.record(&self.controller);
        }
        self.steps += 1;
    }

    fn simulate(&mut self, dt: f32) {
        // 1. Platforms, carrying a grounded rider
        let riding = !self.controller.is_dead() && self.controller.state() == CharacterState::Grounded;
        let body_size = self.controller.config().body_size;
        for platform in &mut self.platforms {
            let on_platform = riding
                && self
                    .world
                    .is_standing_on(platform.solid(), self.controller.position(), body_size);
            let delta = platform.step(&mut self.world, dt);
            if on_platform && delta != Vec2::ZERO {
                self.controller.carry(delta);
            }
        }

        // 2. Character
        self.controller.tick(dt, &self.world);

        // 3. Springs
        if !self.controller.is_dead() {
            let body = self.controller.bounds();
            for spring in &mut self.springs {
                if let Some(launch) = spring.touch(&body) {
                    self.controller.apply_spring(
                        launch.launch,
                        launch.jump_force_modifier,
                        launch.gravity_modifier,
                    );
                }
            }
        }

        // 4. Room exit
        if !self.controller.is_dead() {
            if let Some(edge) = self.config.room.exit_edge(self.controller.position()) {
                tracing::info!("character left the room through the {:?} edge", edge);
                self.controller.die();
            }
        }

        // 5. Respawn
        if self.controller.is_dead() && self.sequencer.phase() == RespawnPhase::Alive {
            self.sequencer.start(&self.config);
        }
        self.sequencer.advance(dt, &self.config, &mut self.controller);
    }

    /// Step `count` times, feeding `script` inputs by scene step.
    pub fn run_script(&mut self, script: &InputScript, count: u64) {
        for _ in 0..count {
            script.apply(self.steps, &mut self.controller);
            self.step();
        }
    }
}

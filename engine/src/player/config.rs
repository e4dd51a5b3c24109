//! Movement configuration.
//!
//! Every tuning constant of the character lives here. A config is fixed for
//! the lifetime of a character; load it from JSON or start from
//! [`MovementConfig::default`], which carries the tuned values.
//!
//! Gravity and the acceleration/deceleration rates are **per tick**, not per
//! second: gravity is subtracted from the vertical velocity once per fixed
//! tick and the rates are lerp fractions. Durations are in seconds.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating a [`MovementConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Physics constants for the platformer character.
///
/// # Example
///
/// ```
/// use feel_engine::player::MovementConfig;
///
/// // Hollow Knight style wall jumps on an otherwise default character
/// let config = MovementConfig {
///     hollow_knight_wall_jump: true,
///     ..MovementConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Body
    // ========================================================================
    /// Full width/height of the character's collision box (tiles).
    pub body_size: Vec2,

    /// Simulation tick length (seconds).
    pub fixed_timestep: f32,

    // ========================================================================
    // Running
    // ========================================================================
    /// Grounded run speed (units/second).
    pub move_speed: f32,

    /// Lerp fraction toward the target speed while input is held.
    pub acceleration: f32,

    /// Lerp fraction toward the target speed while input is neutral.
    pub deceleration: f32,

    /// Multiplier on acceleration/deceleration while airborne.
    pub base_air_friction: f32,

    // ========================================================================
    // Jumping
    // ========================================================================
    /// Vertical velocity set by a jump (set, not added).
    pub jump_force: f32,

    /// Grace window after leaving the ground where a jump still fires.
    pub coyote_time: f32,

    /// How long a jump press is remembered before landing.
    pub jump_buffer_time: f32,

    /// Minimum time between two jumps.
    pub jump_lockout_time: f32,

    /// Releasing jump before this cuts the jump short.
    pub full_hop_time: f32,

    /// Vertical velocity multiplier applied by a short hop.
    pub short_hop_modifier: f32,

    // ========================================================================
    // Gravity
    // ========================================================================
    /// Gravity subtracted from vertical velocity every tick.
    pub base_gravity: f32,

    /// Gravity multiplier while falling.
    pub falling_gravity_modifier: f32,

    /// Gravity multiplier while rising off a spring (springs can override it).
    pub spring_gravity_modifier: f32,

    /// Extra gravity multiplier while holding down.
    pub fast_falling_gravity_modifier: f32,

    /// Lowest vertical velocity when falling normally (negative).
    pub base_terminal_velocity: f32,

    /// Lowest vertical velocity while fast falling (negative).
    pub fast_terminal_velocity: f32,

    /// Lowest vertical velocity while sliding down a wall (negative).
    pub wall_terminal_velocity: f32,

    // ========================================================================
    // Apex hang time
    // ========================================================================
    /// Length of the apex window after the jump peaks.
    pub apex_modifier_duration: f32,

    /// Gravity multiplier inside the apex window.
    pub apex_modifier_gravity: f32,

    /// Horizontal control multiplier inside the apex window.
    pub apex_modifier_speed: f32,

    // ========================================================================
    // Wall jump
    // ========================================================================
    /// Multiplier on `jump_force` for the vertical part of a wall jump.
    pub wall_jump_force_multiplier: f32,

    /// Multiplier on `move_speed` for the horizontal part of a wall jump.
    pub wall_jump_speed_boost: f32,

    /// Time before full air control returns after a wall jump.
    pub wall_jump_lag: f32,

    /// Return air control all at once after the lag instead of gradually.
    pub hollow_knight_wall_jump: bool,

    /// Wall jumps set velocity instead of adding to it.
    pub limit_wall_jump_vertical: bool,

    // ========================================================================
    // Edges
    // ========================================================================
    /// Probe distance for corner correction and sticky edges.
    pub edge_detection_range: f32,

    /// Don't slide off ledges unless holding toward them.
    pub sticky_platforms: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            body_size: Vec2::ONE,
            fixed_timestep: 0.02, // 50 Hz

            move_speed: 5.0,
            acceleration: 0.15,
            deceleration: 0.05,
            base_air_friction: 0.5,

            jump_force: 15.0,
            coyote_time: 0.2,
            jump_buffer_time: 0.2,
            jump_lockout_time: 0.3,
            full_hop_time: 0.35,
            short_hop_modifier: 0.5,

            base_gravity: 0.75,
            falling_gravity_modifier: 2.0,
            spring_gravity_modifier: 1.5,
            fast_falling_gravity_modifier: 1.5,
            base_terminal_velocity: -15.0,
            fast_terminal_velocity: -20.0,
            wall_terminal_velocity: -3.0,

            apex_modifier_duration: 0.1,
            apex_modifier_gravity: 0.9,
            apex_modifier_speed: 1.1,

            wall_jump_force_multiplier: 0.8,
            wall_jump_speed_boost: 1.2,
            wall_jump_lag: 0.8,
            hollow_knight_wall_jump: false,
            limit_wall_jump_vertical: false,

            edge_detection_range: 0.125,
            sticky_platforms: true,
        }
    }
}

impl MovementConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!("loaded movement config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable by the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
            ConfigError::Invalid { field, reason }
        }

        let finite = [
            ("body_size.x", self.body_size.x),
            ("body_size.y", self.body_size.y),
            ("fixed_timestep", self.fixed_timestep),
            ("move_speed", self.move_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("base_air_friction", self.base_air_friction),
            ("jump_force", self.jump_force),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("jump_lockout_time", self.jump_lockout_time),
            ("full_hop_time", self.full_hop_time),
            ("short_hop_modifier", self.short_hop_modifier),
            ("base_gravity", self.base_gravity),
            ("falling_gravity_modifier", self.falling_gravity_modifier),
            ("spring_gravity_modifier", self.spring_gravity_modifier),
            ("fast_falling_gravity_modifier", self.fast_falling_gravity_modifier),
            ("base_terminal_velocity", self.base_terminal_velocity),
            ("fast_terminal_velocity", self.fast_terminal_velocity),
            ("wall_terminal_velocity", self.wall_terminal_velocity),
            ("apex_modifier_duration", self.apex_modifier_duration),
            ("apex_modifier_gravity", self.apex_modifier_gravity),
            ("apex_modifier_speed", self.apex_modifier_speed),
            ("wall_jump_force_multiplier", self.wall_jump_force_multiplier),
            ("wall_jump_speed_boost", self.wall_jump_speed_boost),
            ("wall_jump_lag", self.wall_jump_lag),
            ("edge_detection_range", self.edge_detection_range),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(field, "must be finite"));
        }

        let positive = [
            ("body_size.x", self.body_size.x),
            ("body_size.y", self.body_size.y),
            ("fixed_timestep", self.fixed_timestep),
            ("move_speed", self.move_speed),
            ("jump_force", self.jump_force),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("full_hop_time", self.full_hop_time),
            ("wall_jump_lag", self.wall_jump_lag),
            ("edge_detection_range", self.edge_detection_range),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(invalid(field, "must be greater than zero"));
        }

        let non_negative = [
            ("base_air_friction", self.base_air_friction),
            ("jump_lockout_time", self.jump_lockout_time),
            ("short_hop_modifier", self.short_hop_modifier),
            ("base_gravity", self.base_gravity),
            ("falling_gravity_modifier", self.falling_gravity_modifier),
            ("spring_gravity_modifier", self.spring_gravity_modifier),
            ("fast_falling_gravity_modifier", self.fast_falling_gravity_modifier),
            ("apex_modifier_duration", self.apex_modifier_duration),
            ("apex_modifier_gravity", self.apex_modifier_gravity),
            ("apex_modifier_speed", self.apex_modifier_speed),
            ("wall_jump_force_multiplier", self.wall_jump_force_multiplier),
            ("wall_jump_speed_boost", self.wall_jump_speed_boost),
        ];
        if let Some((field, _)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(invalid(field, "must not be negative"));
        }

        for (field, rate) in [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
        ] {
            if rate <= 0.0 || rate > 1.0 {
                return Err(invalid(field, "lerp fraction must be in (0, 1]"));
            }
        }

        for (field, terminal) in [
            ("base_terminal_velocity", self.base_terminal_velocity),
            ("fast_terminal_velocity", self.fast_terminal_velocity),
            ("wall_terminal_velocity", self.wall_terminal_velocity),
        ] {
            if terminal >= 0.0 {
                return Err(invalid(field, "terminal velocity must be negative"));
            }
        }
        if self.wall_terminal_velocity < self.base_terminal_velocity {
            return Err(invalid(
                "wall_terminal_velocity",
                "wall slide must be slower than a normal fall",
            ));
        }

        Ok(())
    }

    /// The apex/short-hop windows scale with the tick, so the tick has to be
    /// small compared to them. Returns the number of ticks in `seconds`.
    pub fn ticks_in(&self, seconds: f32) -> u32 {
        (seconds / self.fixed_timestep).round() as u32
    }
}

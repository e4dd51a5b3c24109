//! Player Module
//!
//! Platformer character movement: a fixed-tick movement core with coyote
//! time, jump buffering, variable jump height, apex hang time, wall jumps and
//! corner correction.
//!
//! # Components
//!
//! - [`CharacterController`] - Owns one character and runs the per-tick pass chain
//! - [`MovementConfig`] - Tuning constants, loadable from JSON
//! - [`TimerBank`] / [`Contact`] - Count-up timers for every time-gated mechanic
//! - [`StateMachine`] / [`CharacterState`] - Grounded, Airborne, Climb, Dash
//! - [`EventDispatcher`] - Fan-out of [`CharacterEvent`]s to listeners
//!
//! The individual passes live in [`movement`], [`gravity`], [`jump`] and
//! [`corners`].

pub mod config;
pub mod corners;
pub mod events;
pub mod gravity;
pub mod input;
pub mod jump;
pub mod movement;
pub mod movement_controller;
pub mod state;
pub mod timers;

pub use config::{ConfigError, MovementConfig};
pub use events::{CharacterEvent, CharacterId, EventDispatcher, MovementEvent};
pub use gravity::{GravityInputs, air_friction, select_gravity};
pub use input::{AxisInput, JumpEdge, JumpInput, sanitize_axis};
pub use movement::{MovementState, lerp};
pub use movement_controller::{CharacterController, IDLE_SPEED};
pub use state::{CharacterState, StateHooks, StateMachine};
pub use timers::{Contact, TIMER_CEILING, TimerBank};

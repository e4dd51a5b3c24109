//! Platformer Feel Engine
//!
//! A deterministic 2D platformer character movement core. Given per-tick
//! input and collision queries it produces position/velocity updates with
//! the "feel" mechanics players expect: coyote time, jump buffering,
//! variable jump height, apex hang time, wall jumps, corner correction and
//! sticky ledges.
//!
//! # Modules
//!
//! - [`physics`] - 2D boxes, rays and the [`physics::CollisionQuery`] trait
//! - [`player`] - Character controller, movement passes, timers, events
//! - [`world`] - Room bounds, moving platforms, springs
//! - [`scene`] - Fixed-step scene harness, input scripts, replays
//!
//! # Example
//!
//! ```
//! use feel_engine::physics::{Aabb, TileWorld, Vec2};
//! use feel_engine::player::{CharacterController, MovementConfig, MovementEvent};
//!
//! let mut world = TileWorld::new();
//! world.add_solid(Aabb::new(Vec2::new(-20.0, -1.0), Vec2::new(20.0, 0.0)));
//!
//! let config = MovementConfig::default();
//! let dt = config.fixed_timestep;
//! let mut controller = CharacterController::new(config, Vec2::new(0.0, 0.51));
//! let events = controller.dispatcher().subscribe();
//!
//! controller.tick(dt, &world); // settle on the floor
//! controller.set_jump_edge(true);
//! controller.tick(dt, &world);
//!
//! assert!(events.try_iter().any(|e| e.event == MovementEvent::Jumped));
//! ```

pub mod physics;
pub mod player;
pub mod scene;
pub mod world;

// Re-export the types most callers need
pub use physics::{Aabb, CollisionQuery, TileWorld};
pub use player::{CharacterController, CharacterState, MovementConfig, MovementEvent};
pub use scene::{InputScript, PlatformerScene, Replay, SceneConfig};
pub use world::{MovingPlatform, RoomBounds, SpringPad};

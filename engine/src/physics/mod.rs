//! Physics module
//!
//! 2D collision primitives and the query interface the movement core uses to
//! ask about world geometry. Built from scratch without an external physics
//! library: the character is a kinematic box and every contact is an overlap
//! box or a ray.
//!
//! # Unit System
//!
//! **1 unit = 1 tile**. The default character is a 1x1 box.
//!
//! # Submodules
//!
//! - [`types`] - `Vec2` re-exported from glam, [`Aabb`], [`Side`]
//! - [`collision`] - [`CollisionQuery`] trait, ray/box tests, [`TileWorld`]

pub mod collision;
pub mod types;

pub use collision::{
    CollisionQuery, RayHit, RespawnZone, SKIN, SolidId, Sweep, TileWorld, ground_probe,
    ray_aabb_intersect, wall_probe,
};
pub use types::{Aabb, Side, Vec2};

//! World Module
//!
//! Level pieces that live around the character: the room it must stay in,
//! moving platforms that carry it, and springs that launch it.

pub mod platform;
pub mod room;
pub mod spring;

pub use platform::{ARRIVE_DISTANCE, MovingPlatform, PlatformSpec, move_towards};
pub use room::{RoomBounds, RoomEdge};
pub use spring::{SPRING_REACH, SpringPad, SpringSpec};

//! Scene Module
//!
//! Headless harness around the character controller: a fixed-timestep level
//! scene, JSON input scripts, and binary replays for determinism checks.

pub mod platformer_scene;
pub mod replay;
pub mod script;

pub use platformer_scene::{PlatformerScene, RespawnPhase, RespawnSequencer, SceneConfig};
pub use replay::{Replay, ReplayError, TRACE_MAGIC, TickSnapshot, TraceHeader, flags};
pub use script::{InputScript, ScriptError, ScriptInput};

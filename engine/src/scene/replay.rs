//! Replays (.feeltrace)
//!
//! Per-tick snapshots of a character, recorded for determinism checks and
//! offline inspection.
//! Layout: fixed 16-byte header | raw 48-byte [`TickSnapshot`] records.
//!
//! Snapshots are plain old data written as raw bytes, so two runs are
//! identical exactly when their byte streams are.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::player::{CharacterController, CharacterState};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes identifying a trace file.
pub const TRACE_MAGIC: [u8; 4] = *b"FEEL";

/// Current trace format version.
const TRACE_VERSION: u32 = 1;

const HEADER_SIZE: usize = 16;
const SNAPSHOT_SIZE: usize = 48;

/// Snapshot flag bits.
pub mod flags {
    pub const DEAD: u32 = 1 << 0;
    pub const GROUNDED: u32 = 1 << 1;
    pub const JUMP_PRESSED: u32 = 1 << 2;
    pub const SPRING_LAUNCHED: u32 = 1 << 3;
    pub const PAUSED: u32 = 1 << 4;
}

// ============================================================================
// RECORDS
// ============================================================================

/// Fixed-size trace header.
///
/// - `magic` (4) + `version` (4) + `frame_count` (4) + `fixed_timestep` (4) = 16.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TraceHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub frame_count: u32,
    /// Tick length the trace was recorded at (seconds)
    pub fixed_timestep: f32,
}

static_assertions::assert_eq_size!(TraceHeader, [u8; HEADER_SIZE]);

/// One character's state at the end of a tick.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TickSnapshot {
    /// Controller tick counter
    pub tick: u32,
    /// [`CharacterState::code`]
    pub state: u32,
    /// Bitset of [`flags`]
    pub flags: u32,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub since_grounded: f32,
    pub since_jumped: f32,
    pub since_apex: f32,
    pub since_wall_jumped: f32,
    pub air_friction: f32,
}

static_assertions::assert_eq_size!(TickSnapshot, [u8; SNAPSHOT_SIZE]);

impl TickSnapshot {
    /// Capture the controller's current state.
    pub fn capture(controller: &CharacterController) -> Self {
        let movement = controller.movement();
        let timers = controller.timers();

        let mut bits = 0;
        if controller.is_dead() {
            bits |= flags::DEAD;
        }
        if timers.since_grounded().is_touching() {
            bits |= flags::GROUNDED;
        }
        if movement.jump().pressed() {
            bits |= flags::JUMP_PRESSED;
        }
        if movement.is_spring_launched() {
            bits |= flags::SPRING_LAUNCHED;
        }
        if controller.is_paused() {
            bits |= flags::PAUSED;
        }

        Self {
            tick: controller.tick_count() as u32,
            state: controller.state().code(),
            flags: bits,
            position: controller.position().to_array(),
            velocity: controller.velocity().to_array(),
            since_grounded: timers.since_grounded().seconds(),
            since_jumped: timers.since_jumped(),
            since_apex: timers.since_apex(),
            since_wall_jumped: timers.since_wall_jumped(),
            air_friction: movement.air_friction(),
        }
    }

    pub fn state(&self) -> Option<CharacterState> {
        CharacterState::from_code(self.state)
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// Bitwise equality (NaN-safe).
    pub fn same_bits(&self, other: &Self) -> bool {
        bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Errors that can occur while reading a trace.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("file too short for trace header")]
    FileTooShort,
    #[error("invalid magic bytes (expected FEEL)")]
    InvalidMagic,
    #[error("unsupported trace version: {0}")]
    UnsupportedVersion(u32),
    #[error("trace body holds {actual} bytes, header promises {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// REPLAY
// ============================================================================

/// Recorded sequence of tick snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replay {
    fixed_timestep: f32,
    frames: Vec<TickSnapshot>,
}

impl Replay {
    pub fn new(fixed_timestep: f32) -> Self {
        Self {
            fixed_timestep,
            frames: Vec::new(),
        }
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Append the controller's current state.
    pub fn record(&mut self, controller: &CharacterController) {
        self.frames.push(TickSnapshot::capture(controller));
    }

    pub fn frames(&self) -> &[TickSnapshot] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the first frame where two replays differ, or where one ends
    /// early. `None` means the runs were identical.
    pub fn first_divergence(&self, other: &Replay) -> Option<usize> {
        let mismatch = self
            .frames
            .iter()
            .zip(&other.frames)
            .position(|(a, b)| !a.same_bits(b));
        match mismatch {
            Some(index) => Some(index),
            None if self.frames.len() != other.frames.len() => {
                Some(self.frames.len().min(other.frames.len()))
            }
            None => None,
        }
    }

    /// Serialize to the trace layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = TraceHeader {
            magic: TRACE_MAGIC,
            version: TRACE_VERSION,
            frame_count: self.frames.len() as u32,
            fixed_timestep: self.fixed_timestep,
        };
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.frames.len() * SNAPSHOT_SIZE);
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.frames));
        bytes
    }

    /// Parse the trace layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ReplayError::FileTooShort);
        }
        let header: TraceHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_SIZE]);
        if header.magic != TRACE_MAGIC {
            return Err(ReplayError::InvalidMagic);
        }
        if header.version != TRACE_VERSION {
            return Err(ReplayError::UnsupportedVersion(header.version));
        }

        let body = &bytes[HEADER_SIZE..];
        let expected = header.frame_count as usize * SNAPSHOT_SIZE;
        if body.len() != expected {
            return Err(ReplayError::LengthMismatch {
                expected,
                actual: body.len(),
            });
        }

        let frames = body
            .chunks_exact(SNAPSHOT_SIZE)
            .map(bytemuck::pod_read_unaligned::<TickSnapshot>)
            .collect();
        Ok(Self {
            fixed_timestep: header.fixed_timestep,
            frames,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        std::fs::write(path.as_ref(), self.to_bytes())?;
        tracing::info!(
            "wrote {} frames to {}",
            self.frames.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Aabb, TileWorld, Vec2};
    use crate::player::MovementConfig;

    fn recorded_run(ticks: usize) -> Replay {
        let mut world = TileWorld::new();
        world.add_solid(Aabb::new(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0)));
        let config = MovementConfig::default();
        let dt = config.fixed_timestep;
        let mut controller = CharacterController::new(config, Vec2::new(0.0, 0.6));
        let mut replay = Replay::new(dt);
        for i in 0..ticks {
            controller.set_movement_input(if i < 20 { 1.0 } else { 0.0 }, 0.0);
            controller.tick(dt, &world);
            replay.record(&controller);
        }
        replay
    }

    #[test]
    fn test_bytes_parse_back() {
        let replay = recorded_run(30);
        let bytes = replay.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 30 * SNAPSHOT_SIZE);
        assert_eq!(&bytes[..4], b"FEEL");

        let parsed = Replay::from_bytes(&bytes).expect("valid trace");
        assert_eq!(parsed.first_divergence(&replay), None);
        assert_eq!(parsed.fixed_timestep(), replay.fixed_timestep());
    }

    #[test]
    fn test_same_inputs_same_trace() {
        assert_eq!(recorded_run(60).first_divergence(&recorded_run(60)), None);
    }

    #[test]
    fn test_divergence_index() {
        let a = recorded_run(10);
        let mut b = a.clone();
        b.frames[4].velocity[0] += 1.0;
        assert_eq!(a.first_divergence(&b), Some(4));

        let shorter = recorded_run(6);
        assert_eq!(a.first_divergence(&shorter), Some(6));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(Replay::from_bytes(b"FEE"), Err(ReplayError::FileTooShort)));

        let mut bytes = recorded_run(2).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(Replay::from_bytes(&bytes), Err(ReplayError::InvalidMagic)));

        let mut truncated = recorded_run(2).to_bytes();
        truncated.pop();
        assert!(matches!(
            Replay::from_bytes(&truncated),
            Err(ReplayError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_flags() {
        let replay = recorded_run(5);
        let last = replay.frames().last().expect("frames");
        assert!(last.has_flag(flags::GROUNDED));
        assert!(!last.has_flag(flags::DEAD));
        assert_eq!(last.state(), Some(CharacterState::Grounded));
    }
}

//! Headless Movement Simulator
//!
//! Run with: `cargo run --bin feel-sim -- [--config FILE] [--script FILE]`
//!
//! Builds a small demo level (floor with a gap, a wall, a ledge, a spring,
//! a moving platform and a checkpoint), drives one character through it with
//! an input script, logs every movement event and prints a summary.
//!
//! Flags:
//! - `--config FILE`: movement constants (JSON, missing fields use defaults)
//! - `--script FILE`: input timeline (JSON), defaults to a built-in run
//! - `--ticks N`: fixed steps to simulate
//! - `--trace FILE`: write the per-tick replay as raw bytes
//! - `--check-determinism`: run twice and compare the traces

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use feel_engine::physics::{Aabb, TileWorld, Vec2};
use feel_engine::player::{CharacterController, CharacterEvent, MovementConfig, MovementEvent};
use feel_engine::scene::{InputScript, PlatformerScene, Replay, SceneConfig};
use feel_engine::world::{PlatformSpec, RoomBounds, SpringSpec};

#[derive(Parser)]
#[command(name = "feel-sim")]
#[command(about = "Headless platformer movement simulator")]
struct Args {
    /// Path to a movement config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to an input script JSON file
    #[arg(long)]
    script: Option<PathBuf>,
    /// Number of fixed steps (defaults to one second past the last input)
    #[arg(long)]
    ticks: Option<u64>,
    /// Write the recorded replay to this file
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Run the script twice and fail if the traces differ
    #[arg(long)]
    check_determinism: bool,
}

// ============================================================================
// DEMO LEVEL
// ============================================================================

const SPAWN: Vec2 = Vec2::new(-8.0, 0.505);

fn demo_scene(config: MovementConfig) -> PlatformerScene {
    let mut world = TileWorld::new();

    // Floor with a gap between x = 10 and x = 14
    world.add_solid(Aabb::new(Vec2::new(-12.0, -1.0), Vec2::new(10.0, 0.0)));
    world.add_solid(Aabb::new(Vec2::new(14.0, -1.0), Vec2::new(28.0, 0.0)));
    // Left wall and a ledge
    world.add_solid(Aabb::new(Vec2::new(-12.0, 0.0), Vec2::new(-11.0, 12.0)));
    world.add_solid(Aabb::new(Vec2::new(3.0, 2.5), Vec2::new(6.0, 3.0)));
    // Checkpoint on the far side of the gap
    world.add_respawn_zone(
        Aabb::new(Vec2::new(15.0, 0.5), Vec2::new(17.0, 4.0)),
        Vec2::new(16.0, 0.505),
    );

    let controller = CharacterController::new(config, SPAWN);
    let scene_config = SceneConfig {
        room: RoomBounds::new(Vec2::new(8.0, 5.0), Vec2::new(40.0, 20.0)),
        ..SceneConfig::default()
    };
    let mut scene = PlatformerScene::new(scene_config, world, controller);

    scene.add_spring(SpringSpec {
        bounds: Aabb::new(Vec2::new(-4.5, -0.25), Vec2::new(-3.5, 0.0)),
        ..SpringSpec::default()
    });
    scene.add_platform(PlatformSpec {
        begin: Vec2::new(12.0, -0.25),
        end: Vec2::new(12.0, 3.0),
        size: Vec2::new(2.0, 0.5),
        speed: 1.5,
    });
    scene
}

/// Run right, hop the spring, jump onto the ledge, then jump the gap.
fn default_script() -> InputScript {
    InputScript::new("demo run")
        .movement(10, 1.0, 0.0)
        .jump(60, 12)
        .jump(140, 4)
        .jump(215, 15)
        .movement(330, 0.0, 0.0)
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Default)]
struct EventCounts {
    jumps: u32,
    landings: u32,
    wall_jumps: u32,
    springs: u32,
    deaths: u32,
    checkpoints: u32,
}

impl EventCounts {
    fn count(&mut self, event: &CharacterEvent) {
        match event.event {
            MovementEvent::Jumped => self.jumps += 1,
            MovementEvent::Landed => self.landings += 1,
            MovementEvent::WallJumped { .. } => self.wall_jumps += 1,
            MovementEvent::SpringLaunched => self.springs += 1,
            MovementEvent::Died => self.deaths += 1,
            MovementEvent::RespawnZoneEntered { .. } => self.checkpoints += 1,
            MovementEvent::PauseChanged { .. } => {}
        }
    }
}

fn run(config: &MovementConfig, script: &InputScript, ticks: u64) -> (PlatformerScene, Replay, EventCounts) {
    let mut scene = demo_scene(config.clone());
    let events = scene.controller().dispatcher().subscribe();
    scene.start_recording();
    scene.run_script(script, ticks);

    let mut counts = EventCounts::default();
    for event in events.try_iter() {
        tracing::info!("tick {:>5}  {:?}", event.tick, event.event);
        counts.count(&event);
    }
    let replay = scene.take_replay().unwrap_or_default();
    (scene, replay, counts)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).without_time().init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MovementConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MovementConfig::default(),
    };
    let script = match &args.script {
        Some(path) => InputScript::load(path)
            .with_context(|| format!("failed to load script {}", path.display()))?,
        None => default_script(),
    };
    let ticks = args
        .ticks
        .unwrap_or_else(|| script.last_step() + u64::from(config.ticks_in(1.0)));

    tracing::info!("running '{}' for {} steps", script.name, ticks);
    let (scene, replay, counts) = run(&config, &script, ticks);

    if args.check_determinism {
        let (_, second, _) = run(&config, &script, ticks);
        if let Some(frame) = replay.first_divergence(&second) {
            bail!("runs diverged at frame {}", frame);
        }
        println!("determinism: {} frames identical", replay.len());
    }

    if let Some(path) = &args.trace {
        replay
            .save(path)
            .with_context(|| format!("failed to write trace {}", path.display()))?;
    }

    let controller = scene.controller();
    println!("=== {} ===", script.name);
    println!("steps      {}", scene.steps());
    println!("position   ({:.3}, {:.3})", controller.position().x, controller.position().y);
    println!("velocity   ({:.3}, {:.3})", controller.velocity().x, controller.velocity().y);
    println!("state      {:?}{}", controller.state(), if controller.is_dead() { " (dead)" } else { "" });
    println!("respawn    ({:.3}, {:.3})", controller.respawn_point().x, controller.respawn_point().y);
    println!(
        "events     {} jumps, {} landings, {} wall jumps, {} springs, {} deaths, {} checkpoints",
        counts.jumps, counts.landings, counts.wall_jumps, counts.springs, counts.deaths, counts.checkpoints
    );
    Ok(())
}

//! Hopper - headless character controller demo
//!
//! Runs the demo level with a scripted input timeline and reports what the
//! character does. Pass a settings file path to override the default
//! location, or `--init` to write the current settings out to that same
//! location.

mod script;
mod settings;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use hopper_game::{FrameDriver, FrameSnapshot, InputAction, InputHandler};
use hopper_physics::create_backend;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use winit::keyboard::PhysicalKey;

use script::InputScript;
use settings::DemoSettings;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut init = false;
    let mut settings_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--init" => init = true,
            _ => settings_path = Some(PathBuf::from(arg)),
        }
    }

    let settings = DemoSettings::load(settings_path.as_deref());
    if init {
        settings
            .save(settings_path.as_deref())
            .context("Failed to write settings")?;
        return Ok(());
    }

    info!("Starting Hopper...");

    let physics = create_backend(settings.physics.backend, &settings.physics.config)
        .context("Failed to create physics backend")?;
    let mut driver = FrameDriver::new(
        physics,
        settings.time.clone(),
        settings.character.clone(),
        settings.camera.clone(),
        settings.level.clone(),
    )
    .context("Failed to spawn character")?;

    let mut input = InputHandler::new();
    let mut script = InputScript::demo();
    let mut previous = driver.snapshot();
    let mut jumps = 0u32;
    let mut stdout = std::io::stdout().lock();

    for frame in 0..u64::from(settings.run.frames) {
        for (key, state) in script.drain(frame) {
            input.handle_keyboard(PhysicalKey::Code(key), state);
        }
        if input.state.is_just_pressed(InputAction::Pause) {
            driver.time_mut().toggle_pause();
            info!(
                "{} at frame {}",
                if driver.time().paused { "Paused" } else { "Resumed" },
                frame
            );
        }

        let snapshot = driver.frame(&input, settings.run.frame_delta);
        input.end_frame();

        if snapshot.character.is_jumping && !previous.character.is_jumping {
            jumps += 1;
            info!("Jump at frame {} from {:.2}", snapshot.frame, previous.position);
        } else if !snapshot.character.is_jumping && previous.character.is_jumping {
            info!("Landed at frame {} on {:.2}", snapshot.frame, snapshot.position);
        }

        let log_every = u64::from(settings.run.log_every);
        if log_every > 0 && frame % log_every == 0 {
            if settings.run.json {
                let line = serde_json::to_string(&snapshot)?;
                writeln!(stdout, "{}", line)?;
            } else {
                log_snapshot(&snapshot);
            }
        }

        previous = snapshot;
    }
    if !script.is_finished() {
        warn!(
            "Run ended before the input script (last event on frame {})",
            script.last_frame().unwrap_or_default()
        );
    }

    info!(
        "Finished {} frames on {} physics: {} jumps, {} respawns, resting at {:.2}",
        settings.run.frames,
        driver.physics().name(),
        jumps,
        driver.respawns(),
        previous.position
    );

    Ok(())
}

fn log_snapshot(snapshot: &FrameSnapshot) {
    let state = &snapshot.character;
    info!(
        "frame {:>5} t={:>6.2}s pos={:.2} vel={:.2} grounded={} phase={:?} steps={}",
        snapshot.frame,
        snapshot.time,
        snapshot.position,
        state.velocity,
        state.is_grounded,
        state.phase,
        snapshot.physics_steps
    );
}

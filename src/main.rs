//! Shapeshift - headless driver for the shape-switching platformer
//!
//! Builds the demo level in the rapier world, plays a scripted run through the
//! game session and prints the telemetry report.

mod demo;
mod settings;

use std::fs;

use anyhow::{Context, Result};
use shapeshift_game::{GameSession, InputState, PlayerEvent};
use shapeshift_physics::PhysicsWorld;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::GameSettings;

fn log_event(event: &PlayerEvent) {
    match event {
        PlayerEvent::ShapeChanged { from, to, kind } => {
            info!(%from, %to, ?kind, "Shape changed")
        }
        PlayerEvent::Respawned { position } => {
            info!(x = position.x, y = position.y, "Respawned")
        }
        other => debug!(?other, "Event"),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Shapeshift...");
    let settings = GameSettings::load();

    let mut world = PhysicsWorld::with_config(settings.physics.clone());
    demo::build_level(&mut world);

    let mut session = GameSession::new(
        world,
        settings.session.clone(),
        demo::stages(),
        settings.gameplay.start_shape,
        demo::SPAWN,
    )
    .context("Failed to start game session")?;
    session.add_stage_boundary(demo::gate());
    let (id, spawn, trigger) = demo::checkpoint();
    session.add_checkpoint(id, spawn, trigger);

    let dt = 1.0 / settings.gameplay.simulated_fps.max(1.0);
    let mut script = demo::tour();
    let frames = ((script.duration() + 2.0) / dt).ceil() as u32;
    let mut input = InputState::new();

    info!(frames, dt, "Running scripted tour");
    for _ in 0..frames {
        script.step(&mut input, dt);
        let events = session.frame(&input, dt);
        events.iter().for_each(log_event);
        input.clear_frame();
    }

    let player = session.player();
    info!(
        shape = %player.current(),
        x = player.position().x,
        y = player.position().y,
        stage = %session.stages().current().name,
        "Tour finished"
    );

    let report = session.export_stats().context("Failed to export telemetry")?;
    println!("{report}");

    if settings.gameplay.save_telemetry {
        let dir = dirs::config_dir()
            .map(|p| p.join("shapeshift"))
            .context("Could not determine config directory")?;
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
        let path = dir.join(format!("telemetry-{}.json", session.stats().session_id));
        fs::write(&path, report).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Saved telemetry to {:?}", path);
    }

    Ok(())
}

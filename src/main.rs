//! Kinetic Puzzle headless runner
//!
//! Plays the built-in levels with a simple autopilot (hold right, jump when
//! stalled) and logs the lifecycle.
//!
//! Usage: `kinetic-puzzle [settings.json] [levels.json]`

use kinetic_puzzle::consts::CELEBRATION_ASSET;
use kinetic_puzzle::level::LevelCatalog;
use kinetic_puzzle::physics::RapierBackend;
use kinetic_puzzle::sim::{AssetCatalog, LevelController, LevelEvent};
use kinetic_puzzle::{Game, Screen, Settings, SimError, TickInput};

/// Simulated seconds to spend on each level before giving up
const LEVEL_TIME_LIMIT: f32 = 60.0;
/// Rendered frame time the runner pretends to have
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), SimError> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let catalog = match args.next() {
        Some(path) => LevelCatalog::load(path)?,
        None => LevelCatalog::builtin()?,
    };

    let mut assets = AssetCatalog::new();
    assets.insert(CELEBRATION_ASSET, glam::Vec2::splat(16.0));

    let total = settings.total_levels;
    let level = LevelController::new(RapierBackend::default(), settings, catalog, assets);
    let mut game = Game::with_controller(level);
    game.start_level(1)?;

    let mut stalled_frames = 0u32;
    let mut frame = 0u64;
    while game.screen() == Screen::Playing {
        let level = game.level();
        if level.elapsed() > LEVEL_TIME_LIMIT {
            log::warn!(
                "Autopilot stuck on level {} ({}), stopping",
                level.level_number(),
                level.hint()
            );
            break;
        }

        let speed = level
            .actor()
            .and_then(|actor| actor.entity().velocity(level.backend()))
            .map_or(0.0, |v| v.length());
        stalled_frames = if speed < 5.0 { stalled_frames + 1 } else { 0 };

        let input = TickInput {
            right: true,
            // Tap jump every half second while stalled
            action: stalled_frames > 0 && (stalled_frames / 15) % 2 == 1,
            ..TickInput::default()
        };

        for event in game.frame(FRAME_DT, &input)? {
            match event {
                LevelEvent::Loaded(n) => {
                    log::info!("Level {n}: {}", game.level().hint());
                    stalled_frames = 0;
                }
                LevelEvent::Completed(n) => log::info!("Cleared level {n} of {total}"),
                other => log::debug!("{other:?}"),
            }
        }
        frame += 1;
    }

    let progress = game.level().progress();
    log::info!(
        "Finished after {frame} frames: {} of {} levels completed",
        progress.levels_completed(),
        progress.total_levels()
    );
    Ok(())
}

//! Headless skirmish demonstrating the ship AI
//!
//! Usage: `starskirmish [scene.ron|scene.json]`
//!
//! Set `SIM_CONFIG` to a RON file to override the tuning.

use starskirmish::prelude::*;

/// Fixed simulation step
const TICK: f32 = 1.0 / 60.0;
/// Two simulated minutes
const MAX_TICKS: u64 = 60 * 120;

fn load_config() -> SimConfig {
    let Ok(path) = std::env::var("SIM_CONFIG") else {
        return SimConfig::default();
    };
    match SimConfig::load_ron(&path) {
        Ok(config) => {
            log::info!("Loaded config from {path}");
            config
        }
        Err(e) => {
            log::warn!("Ignoring config {path}: {e}");
            SimConfig::default()
        }
    }
}

fn load_scene() -> Result<ArenaScene, SceneError> {
    match std::env::args().nth(1) {
        Some(path) => ArenaScene::load(path),
        None => Ok(ArenaScene::skirmish()),
    }
}

fn log_events(arena: &Arena) {
    for event in arena.events().iter() {
        match event {
            GameEvent::StateChanged { agent, from, to } => {
                log::debug!("{agent:?}: {from} -> {to}");
            }
            GameEvent::AgentDestroyed { agent, destroyer } => {
                log::info!("{agent:?} destroyed by {destroyer:?}");
            }
            GameEvent::AgentDamaged {
                agent, remaining, ..
            } => {
                log::debug!("{agent:?} hit, hull {remaining}");
            }
            other => log::trace!("{other:?}"),
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    let scene = match load_scene() {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Scene error: {e}");
            std::process::exit(1);
        }
    };
    let mut arena = match Arena::new(&scene, config) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("Scene error: {e}");
            std::process::exit(1);
        }
    };

    // Go after the nearest hostile, as a player would
    let player = arena.player().position();
    let nearest = arena
        .hostiles()
        .iter()
        .min_by(|a, b| {
            a.position()
                .distance_squared(player)
                .total_cmp(&b.position().distance_squared(player))
        })
        .map(HostileShip::position);
    if let Some(point) = nearest {
        arena.touch(point);
    }

    for _ in 0..MAX_TICKS {
        let outcome = arena.step(TICK);
        log_events(&arena);

        // Pick the next target once the current one is gone
        if outcome == Outcome::Ongoing && arena.player().state() == PlayerState::Idle {
            if let Some(next) = arena.hostiles().first().map(HostileShip::position) {
                arena.touch(next);
            }
        }
        if outcome != Outcome::Ongoing {
            break;
        }
    }

    log::info!(
        "Finished after {:.1}s: {:?}, hull {:?}, {} hostiles left",
        arena.elapsed(),
        arena.outcome(),
        arena.player_hull(),
        arena.hostiles().len()
    );
}

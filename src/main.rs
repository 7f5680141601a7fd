/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LogConfig};
use sim::loader::load_level_set;
use sim::session::Session;
use ui::controller::Controller;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Hud, TerminalRenderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(10);

fn main() {
    let config = GameConfig::load();
    init_logging(&config.log);

    let defs = load_level_set(&config);
    info!(levels = defs.len(), dir = %config.levels_dir.display(), "level set loaded");

    let mut session = match Session::new(defs, 0) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "first level failed to build");
            eprintln!("Cannot start: {e}");
            return;
        }
    };
    session.set_momentum(config.play.momentum);

    let mut renderer = TerminalRenderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Chronocrate!");
    println!(
        "Reached level {} of {}.",
        session.index() + 1,
        session.level_count()
    );
}

/// Log to a file: the terminal belongs to the game while it runs.
/// RUST_LOG, when set, overrides the configured filter.
fn init_logging(cfg: &LogConfig) {
    let file = match File::create(&cfg.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", cfg.file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn game_loop(
    session: &mut Session,
    renderer: &mut TerminalRenderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let mut controller = Controller::new(config.play.summon_time);

    loop {
        // Keep the level's screen mapping in step with the terminal, so
        // clicks land on the cell under the pointer.
        let layout = renderer.fit(session.level(), &config.display);
        session.set_layout(layout);

        kb.drain_events();
        gp.update();

        let actions = kb.actions().iter().chain(gp.actions()).copied();
        for action in actions {
            let reaction = controller.handle(action, session)?;
            if reaction.quit {
                info!("quit");
                return Ok(());
            }
            if let (Some(sfx), Some(engine)) = (reaction.sfx, sound) {
                engine.play(sfx);
            }
        }

        let hud = Hud {
            level_index: session.index(),
            level_count: session.level_count(),
            summon_time: controller.summon_time(),
            cursor: controller.cursor(),
            message: controller.message(),
            finished: controller.is_finished(),
            gamepad: gp.connected,
        };
        renderer.render(session.level(), &hud)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::media::{AudioElement, MediaElement};
use crate::mpris::ControlCmd;
use crate::player::{ControllerOptions, PlaybackController};

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, fallback) = settings::load_settings();
    logging::init(&settings.logging);
    if let Some(reason) = fallback {
        warn!("spindle: {reason}");
    }

    let base = startup::base_dir(env::args().nth(1));
    let catalog = startup::build_catalog(&base, &settings.catalog);
    info!(
        music = %catalog.music_dir().display(),
        tracks = catalog.len(),
        "spindle: starting"
    );

    let media = AudioElement::new(&settings.media);
    let mut controller = PlaybackController::new(media, ControllerOptions::from(&settings.ui));
    controller.initialize(catalog)?;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        state.cursor = controller.state().selected.unwrap_or(0);

        event_loop::run(
            &mut terminal,
            &settings,
            &mut controller,
            &mpris,
            &control_rx,
            &mut state,
        )
    })();

    controller.teardown();
    controller
        .media()
        .quit_softly(Duration::from_millis(settings.media.quit_fade_out_ms));
    info!(position = controller.media().position(), "spindle: stopped");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

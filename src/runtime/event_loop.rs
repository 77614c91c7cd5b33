use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::config;
use crate::media::MediaElement;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{PlaybackController, PlayerError};
use crate::runtime::mpris_sync::MprisSync;
use crate::ui::{self, View};

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Highlighted row in the track list; independent of the selection.
    pub cursor: usize,
    /// Animation frame counter for the disc glyph.
    step: usize,
    mpris: MprisSync,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }

    fn follow_selection<M: MediaElement>(&mut self, controller: &PlaybackController<M>) {
        if let Some(selected) = controller.state().selected {
            self.cursor = selected;
        }
    }
}

/// Failed user intents are not fatal; the state simply stays as it was.
fn ignore(action: &str, result: Result<(), PlayerError>) {
    if let Err(e) = result {
        debug!(action, "player: ignored: {e}");
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the media
/// element and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run<M: MediaElement>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    controller: &mut PlaybackController<M>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        controller.process_events();
        state.mpris.update(mpris, controller);

        let spinning = controller.state().is_playing || controller.is_rotating(Instant::now());
        if spinning {
            state.step = state.step.wrapping_add(1);
        }

        let view = View {
            state: controller.state(),
            catalog: controller.catalog(),
            cursor: state.cursor,
            spinning,
            step: state.step,
        };
        terminal.draw(|f| ui::draw(f, &view, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, controller, mpris, state)? {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, controller, mpris, state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn seek_and_announce<M: MediaElement>(
    controller: &mut PlaybackController<M>,
    mpris: &MprisHandle,
    result: impl FnOnce(&mut PlaybackController<M>) -> Result<(), PlayerError>,
) {
    match result(controller) {
        Ok(()) => mpris.seeked(controller.state().current_time_seconds),
        Err(e) => debug!("player: seek ignored: {e}"),
    }
}

fn handle_control_cmd<M: MediaElement>(
    cmd: ControlCmd,
    controller: &mut PlaybackController<M>,
    mpris: &MprisHandle,
    state: &mut EventLoopState,
) -> Result<bool, Box<dyn std::error::Error>> {
    let playing = controller.state().is_playing;
    match cmd {
        ControlCmd::Quit => return Ok(true),
        ControlCmd::Play => {
            if !playing {
                ignore("play", controller.toggle_playback());
            }
        }
        ControlCmd::Pause => {
            if playing {
                ignore("pause", controller.toggle_playback());
            }
        }
        ControlCmd::PlayPause => ignore("play-pause", controller.toggle_playback()),
        ControlCmd::Next => {
            ignore("next", controller.select_relative(1));
            state.follow_selection(controller);
        }
        ControlCmd::Prev => {
            ignore("prev", controller.select_relative(-1));
            state.follow_selection(controller);
        }
        ControlCmd::Seek(offset) => {
            seek_and_announce(controller, mpris, |c| c.seek_by(offset as f64 / 1_000_000.0));
        }
        ControlCmd::SetPosition(position) => {
            seek_and_announce(controller, mpris, |c| c.seek(position as f64 / 1_000_000.0));
        }
    }

    Ok(false)
}

fn handle_key_event<M: MediaElement>(
    key: KeyEvent,
    settings: &config::Settings,
    controller: &mut PlaybackController<M>,
    mpris: &MprisHandle,
    state: &mut EventLoopState,
) -> Result<bool, Box<dyn std::error::Error>> {
    let len = controller.catalog().map_or(0, |c| c.len());
    let scrub = settings.controls.scrub_seconds as f64;

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('j') | KeyCode::Down => {
            if state.cursor + 1 < len {
                state.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.cursor = state.cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            if len > 0 {
                ignore("select", controller.select_track(state.cursor));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            ignore("toggle", controller.toggle_playback());
        }
        KeyCode::Char('n') => {
            ignore("next", controller.select_relative(1));
            state.follow_selection(controller);
        }
        KeyCode::Char('N') => {
            ignore("prev", controller.select_relative(-1));
            state.follow_selection(controller);
        }
        KeyCode::Char('L') => seek_and_announce(controller, mpris, |c| c.seek_by(scrub)),
        KeyCode::Char('H') => seek_and_announce(controller, mpris, |c| c.seek_by(-scrub)),
        KeyCode::Char(c @ '0'..='9') => {
            let duration = controller.state().duration_seconds;
            if controller.state().duration_known() {
                let tenth = f64::from(c as u8 - b'0');
                seek_and_announce(controller, mpris, |p| p.seek(duration * tenth / 10.0));
            }
        }
        _ => {}
    }

    Ok(false)
}

//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::catalog::Catalog;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{PlaybackState, format_time};

const DISC_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "select song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("n/N".to_string(), "next/prev song".to_string());
    map.insert("0-9".to_string(), "seek to 0-90%".to_string());
    // H/L is filled dynamically from config.
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub state: &'a PlaybackState,
    pub catalog: Option<&'a Catalog>,
    pub cursor: usize,
    /// Disc animation is running (playing or mid track-change rotation).
    pub spinning: bool,
    /// Monotonic frame counter driving the animation.
    pub step: usize,
}

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = ["j/k", "enter", "space/p", "H/L", "n/N", "0-9", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn disc_glyph(spinning: bool, step: usize) -> &'static str {
    if spinning {
        DISC_FRAMES[step % DISC_FRAMES.len()]
    } else {
        DISC_FRAMES[0]
    }
}

fn headline(view: &View) -> String {
    let track = view
        .catalog
        .zip(view.state.selected)
        .and_then(|(catalog, i)| catalog.get(i));
    match track {
        Some(track) => format!("Now Playing: {}", track.title),
        None => "Select a song to play:".to_string(),
    }
}

fn cover_label(view: &View) -> String {
    view.catalog
        .zip(view.state.selected)
        .and_then(|(catalog, i)| catalog.get(i).and_then(|t| catalog.image_location(t)))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "no cover".to_string())
}

/// `elapsed  [Play|Pause]  duration`. The button names the action it would take.
fn time_row(state: &PlaybackState) -> String {
    let button = if state.is_playing { "Pause" } else { "Play" };
    format!(
        "{}  [{}]  {}",
        format_time(state.current_time_seconds),
        button,
        format_time(state.duration_seconds)
    )
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, view: &View, ui_settings: &UiSettings, controls_settings: &ControlsSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" spindle ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Cover panel
    let cover = format!(
        "{}  {}\n\n{}",
        disc_glyph(view.spinning, view.step),
        cover_label(view),
        headline(view)
    );
    let cover_par = Paragraph::new(cover)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(cover_par, chunks[1]);

    // Track list
    {
        let tracks = view.catalog.map(Catalog::tracks).unwrap_or_default();
        let items: Vec<ListItem> = tracks
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let marker = if view.state.selected == Some(i) { "♪ " } else { "  " };
                ListItem::new(format!("{marker}{}", t.title))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if !tracks.is_empty() {
            state.select(Some(view.cursor.min(tracks.len() - 1)));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Time row and seek bar
    {
        let block = Block::default().borders(Borders::ALL).title(" position ");
        let inner = block.inner(chunks[3]);
        frame.render_widget(block, chunks[3]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(
            Paragraph::new(time_row(view.state)).alignment(Alignment::Center),
            rows[0],
        );
        frame.render_widget(
            Gauge::default().ratio(view.state.progress()).label(""),
            rows[1],
        );
    }

    let footer_text = controls_text(controls_settings.scrub_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}

//! UI rendering module for Placeboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod detail;
pub mod forms;
pub mod help_overlay;
pub mod listing;

pub use detail::render as render_place_detail;
pub use forms::{render_login, render_register};
pub use help_overlay::render as render_help_overlay;
pub use listing::render as render_listing;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};

/// Renders the UI based on the current application state
pub fn render(frame: &mut Frame, app: &App) {
    match &app.state {
        AppState::Loading => render_loading(frame),
        AppState::Listing => render_listing(frame, app),
        AppState::PlaceDetail(_) => render_place_detail(frame, app),
        AppState::Login => render_login(frame, app),
        AppState::Register => render_register(frame, app),
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Renders a loading message while the first listing load is in flight
fn render_loading(frame: &mut Frame) {
    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading places...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Collects every cell symbol of a test terminal into one string
#[cfg(test)]
pub(crate) fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_loading_screen() {
        let app = App::new();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        assert!(buffer_text(&terminal).contains("Loading places..."));
    }

    #[test]
    fn test_help_overlay_drawn_over_view() {
        let mut app = App::new();
        app.state = AppState::Listing;
        app.show_help = true;
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        assert!(buffer_text(&terminal).contains("Keyboard Shortcuts"));
    }
}

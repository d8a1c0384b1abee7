//! Top-level UI layout: form panel with a status bar and overlays on top.

pub mod form_panel;
pub mod overlays;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

use crate::app::{AppState, Overlay};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let title = if app.controller.is_in_flight() {
        " New Backtest (submitting...) "
    } else {
        " New Backtest "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(app.overlay == Overlay::None))
        .title(title)
        .title_style(theme::panel_title(app.overlay == Overlay::None));
    let inner = block.inner(main_area);
    f.render_widget(block, main_area);

    form_panel::render(f, inner, app);
    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::TokenPrompt => overlays::render_token_prompt(f, main_area, &app.token_input),
        Overlay::None => {}
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

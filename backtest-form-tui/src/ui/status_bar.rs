//! Bottom status bar: last status message and key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " ^S:Submit ^A:Add ^T:Token ^R:Reload ^E:Errors F1:Help Esc:Quit",
        theme::muted(),
    ));

    spans.push(Span::raw(" | "));

    let catalogs = app.catalogs();
    spans.push(Span::styled(
        format!(
            "{} coins, {} indicators",
            catalogs.coins.len(),
            catalogs.indicators.len()
        ),
        theme::neutral(),
    ));

    if let Some((msg, level)) = &app.status_message {
        spans.push(Span::raw(" | "));
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Success => theme::positive(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    let line = Line::from(spans);
    let para = Paragraph::new(line);
    f.render_widget(para, area);
}

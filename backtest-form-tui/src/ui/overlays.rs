//! Overlay widgets: help, error history, token prompt.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

/// Key reference overlay.
pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keys [any key]close ")
        .title_style(theme::accent_bold());

    let mut lines: Vec<Line> = Vec::new();
    section(&mut lines, "Form");
    key(&mut lines, "Tab / Down", "Next input");
    key(&mut lines, "Shift+Tab / Up", "Previous input");
    key(&mut lines, "Left / Right", "Choose coin or indicator");
    key(&mut lines, "Backspace", "Delete character / clear choice");
    key(&mut lines, "Enter", "Activate button, else next input");
    lines.push(Line::from(""));

    section(&mut lines, "Actions");
    key(&mut lines, "Ctrl+A", "Add a parameter row");
    key(&mut lines, "Ctrl+S", "Submit the backtest");
    key(&mut lines, "Ctrl+T", "Enter a bearer token (reloads catalogs)");
    key(&mut lines, "Ctrl+R", "Reload coins and indicators");
    key(&mut lines, "Ctrl+E", "Error history");
    key(&mut lines, "Esc / Ctrl+C", "Quit");

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(para, popup);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let visible_height = inner.height as usize;
    let start = app.error_scroll;
    let end = (start + visible_height).min(app.error_history.len());

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app.error_history.iter().enumerate().take(end).skip(start) {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, inner);
}

/// Bearer token prompt. Input is masked.
pub fn render_token_prompt(f: &mut Frame, area: Rect, input: &str) {
    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Bearer Token [Enter]apply [Esc]cancel ")
        .title_style(theme::accent_bold());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Paste or type the API token:", theme::muted())),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", theme::accent()),
            Span::styled("*".repeat(input.chars().count()), theme::accent_bold()),
            Span::styled("_", theme::accent()),
        ]),
    ];

    let para = Paragraph::new(text);
    f.render_widget(para, inner);
}

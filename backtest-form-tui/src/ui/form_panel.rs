//! The backtest form: scalar inputs, parameter rows and the two buttons.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use backtest_form_core::{Catalogs, ParamField, ScalarField};

use crate::app::{AppState, Focus};
use crate::theme;

const LABEL_WIDTH: usize = 12;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let focus = app.focused();
    let catalogs = app.catalogs();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "[Tab/Up/Down]move [Left/Right]choose [Enter]activate",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    for field in ScalarField::ALL {
        let raw = app.form.scalar(field);
        let shown = match field {
            ScalarField::Coin => coin_label(catalogs, raw),
            _ => raw.to_string(),
        };
        let item = Focus::Scalar(field);
        lines.push(Line::from(vec![
            Span::styled(format!("{:>LABEL_WIDTH$}: ", field.label()), theme::neutral()),
            input_span(shown, field == ScalarField::Coin, focus == item),
            hint_span(field, focus == item),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Parameters", theme::accent_bold())));
    for (row, param) in app.form.parameters().iter().enumerate() {
        let indicator = Focus::Param { row, field: ParamField::IndicatorId };
        let value = Focus::Param { row, field: ParamField::Value };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>LABEL_WIDTH$}: ", format!("Parameter {}", row + 1)), theme::neutral()),
            input_span(
                indicator_label(catalogs, &param.indicator_id),
                true,
                focus == indicator,
            ),
            Span::styled("  value ", theme::muted()),
            input_span(param.value.clone(), false, focus == value),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 2)),
        button_span("[+ Add parameter]", focus == Focus::AddRow, theme::accent()),
        Span::raw("   "),
        button_span("[Submit]", focus == Focus::Submit, submit_style(app)),
    ]));

    if let Some(created) = app.controller.last_created() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Last created: ", theme::muted()),
            Span::styled(created.to_string(), theme::positive()),
        ]));
    }

    let para = Paragraph::new(lines);
    f.render_widget(para, area);
}

fn coin_label(catalogs: &Catalogs, symbol: &str) -> String {
    if symbol.is_empty() {
        return String::new();
    }
    catalogs
        .coin_by_symbol(symbol)
        .map_or_else(|| symbol.to_string(), |c| c.label())
}

fn indicator_label(catalogs: &Catalogs, id: &str) -> String {
    if id.is_empty() {
        return String::new();
    }
    catalogs
        .indicator_by_id(id)
        .map_or_else(|| id.to_string(), |i| i.name.clone())
}

fn input_span(text: String, select: bool, focused: bool) -> Span<'static> {
    let style = if focused { theme::focused() } else { theme::text() };
    match (select, text.is_empty()) {
        (true, false) => Span::styled(format!("< {text} >"), style),
        (false, false) => Span::styled(text, style),
        (false, true) if focused => Span::styled("_", style),
        (true, true) if focused => Span::styled("< choose >", style),
        (true, true) => Span::styled("< choose >", theme::muted()),
        (false, true) => Span::styled("......", theme::muted()),
    }
}

fn hint_span(field: ScalarField, focused: bool) -> Span<'static> {
    if focused && field.is_date() {
        Span::styled("  YYYY-MM-DD", theme::muted())
    } else {
        Span::raw("")
    }
}

fn button_span(label: &'static str, focused: bool, base: Style) -> Span<'static> {
    if focused {
        Span::styled(label, theme::focused())
    } else {
        Span::styled(label, base)
    }
}

fn submit_style(app: &AppState) -> Style {
    if app.controller.is_in_flight() {
        theme::warning()
    } else {
        theme::positive()
    }
}

//! Keyboard input dispatch: control chords, then overlays, then the focused item.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use backtest_form_core::BearerToken;

use crate::app::{AppState, Focus, Overlay};

/// Handle a key event. Sets `app.running = false` on quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::TokenPrompt => {
            handle_token_prompt(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Control chords (available from any item).
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('a') => app.append_row(),
            KeyCode::Char('s') => app.try_submit(),
            KeyCode::Char('t') => {
                app.token_input.clear();
                app.overlay = Overlay::TokenPrompt;
            }
            KeyCode::Char('r') => app.reload_catalogs(),
            KeyCode::Char('e') => {
                app.error_scroll = 0;
                app.overlay = Overlay::ErrorHistory;
            }
            _ => {}
        }
        return;
    }

    // 3. Navigation and editing.
    match key.code {
        KeyCode::Esc => app.running = false,
        KeyCode::F(1) => app.overlay = Overlay::Help,
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
        KeyCode::Left => app.cycle_select(-1),
        KeyCode::Right => app.cycle_select(1),
        KeyCode::Enter => match app.focused() {
            Focus::AddRow => app.append_row(),
            Focus::Submit => app.try_submit(),
            _ => app.focus_next(),
        },
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(c) => app.type_char(c),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_token_prompt(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.token_input.clear();
        }
        KeyCode::Enter => {
            let token = app.token_input.trim().to_string();
            app.token_input.clear();
            app.overlay = Overlay::None;
            if token.is_empty() {
                app.set_warning("Token unchanged");
            } else {
                app.set_token(BearerToken::new(token));
            }
        }
        KeyCode::Backspace => {
            app.token_input.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.token_input.push(c);
        }
        _ => {}
    }
}

//! Arbitrary key sequences keep the form consistent.

use std::sync::mpsc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;

use backtest_form_core::BearerToken;
use backtest_form_tui::app::{AppState, Overlay};
use backtest_form_tui::handle_key;

fn key_strategy() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        Just(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
        Just(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)),
        Just(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)),
        Just(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL)),
        Just(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE)),
        "[0-9a-z.\\- ]".prop_map(|s| {
            let c = s.chars().next().unwrap_or('x');
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
        }),
    ]
}

proptest! {
    #[test]
    fn focus_stays_in_range_and_rows_only_grow(keys in proptest::collection::vec(key_strategy(), 0..80)) {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let mut app = AppState::new(cmd_tx, resp_rx, BearerToken::new("tok"), false);

        let mut rows = app.form.parameters().len();
        for key in keys {
            handle_key(&mut app, key);
            // Dismiss overlays so the sequence keeps editing the form.
            if app.overlay != Overlay::None {
                app.overlay = Overlay::None;
            }

            prop_assert!(app.focus_idx < app.focus_items().len());
            prop_assert!(app.form.parameters().len() >= rows);
            rows = app.form.parameters().len();
            prop_assert!(app.running);
        }
    }
}

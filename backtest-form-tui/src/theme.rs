//! Parrot/neon theme tokens for the backtest form TUI
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focused input, highlights)
//! - **Positive**: Neon green (created backtests, loaded catalogs)
//! - **Negative**: Hot pink (errors)
//! - **Warning**: Neon orange (validation hints, in-flight state)
//! - **Neutral**: Cool purple (labels)
//! - **Muted**: Steel blue (hints, empty values)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub const fn parrot_neon() -> Self {
        Self {
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
        }
    }
}

const THEME: Theme = Theme::parrot_neon();

pub fn accent() -> Style {
    Style::default().fg(THEME.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(THEME.positive)
}

pub fn negative() -> Style {
    Style::default().fg(THEME.negative)
}

pub fn warning() -> Style {
    Style::default().fg(THEME.warning)
}

pub fn neutral() -> Style {
    Style::default().fg(THEME.neutral)
}

pub fn muted() -> Style {
    Style::default().fg(THEME.muted)
}

pub fn text() -> Style {
    Style::default().fg(THEME.text_primary)
}

/// Focused input: reversed accent.
pub fn focused() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

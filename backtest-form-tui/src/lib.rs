//! Backtest form TUI - terminal front-end for creating backtests
//!
//! Provides:
//! - Coin and indicator selects fed from the service catalogs
//! - A growable list of indicator/value parameter rows
//! - Input-boundary validation before anything is sent
//! - Background worker for all HTTP calls

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use input::handle_key;

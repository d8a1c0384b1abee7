//! Application state, owned by the main thread.
//!
//! All form state lives here. The worker thread communicates via channels and
//! its results are applied by `apply_response` on the main thread, so every
//! mutation runs to completion inside one event before the next is handled.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;
use tracing::{debug, error};

use backtest_form_core::validation;
use backtest_form_core::{
    ApplyOutcome, BearerToken, Catalogs, FieldTarget, FormState, ParamField,
    ReferenceDataLoader, ScalarField, SubmissionController, SubmitError,
};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;
const DATE_LEN: usize = 10;

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Catalog,
    Submission,
    Contract,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Catalog => "CAT",
            ErrorCategory::Submission => "SUB",
            ErrorCategory::Contract => "BUG",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// A focusable input or button, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Scalar(ScalarField),
    Param { row: usize, field: ParamField },
    AddRow,
    Submit,
}

impl Focus {
    pub fn is_select(self) -> bool {
        matches!(
            self,
            Focus::Scalar(ScalarField::Coin)
                | Focus::Param {
                    field: ParamField::IndicatorId,
                    ..
                }
        )
    }
}

impl From<FieldTarget> for Focus {
    fn from(target: FieldTarget) -> Self {
        match target {
            FieldTarget::Scalar(field) => Focus::Scalar(field),
            FieldTarget::Param { row, field } => Focus::Param { row, field },
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
    TokenPrompt,
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,

    // Form
    pub form: FormState,
    pub loader: ReferenceDataLoader,
    pub controller: SubmissionController,
    pub token: BearerToken,
    pub cross_field_checks: bool,
    pub focus_idx: usize,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub token_input: String,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        token: BearerToken,
        cross_field_checks: bool,
    ) -> Self {
        Self {
            running: true,
            form: FormState::new(),
            loader: ReferenceDataLoader::new(),
            controller: SubmissionController::new(),
            token,
            cross_field_checks,
            focus_idx: 0,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            token_input: String::new(),
        }
    }

    pub fn catalogs(&self) -> &Catalogs {
        self.loader.catalogs()
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Every focusable item, top to bottom.
    pub fn focus_items(&self) -> Vec<Focus> {
        let mut items: Vec<Focus> = ScalarField::ALL.iter().copied().map(Focus::Scalar).collect();
        for row in 0..self.form.parameters().len() {
            for field in ParamField::ALL {
                items.push(Focus::Param { row, field });
            }
        }
        items.push(Focus::AddRow);
        items.push(Focus::Submit);
        items
    }

    pub fn focused(&self) -> Focus {
        let items = self.focus_items();
        items[self.focus_idx.min(items.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        let len = self.focus_items().len();
        self.focus_idx = (self.focus_idx + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.focus_items().len();
        self.focus_idx = (self.focus_idx + len - 1) % len;
    }

    pub fn focus_on(&mut self, target: Focus) {
        if let Some(idx) = self.focus_items().iter().position(|f| *f == target) {
            self.focus_idx = idx;
        }
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Append a parameter row and move focus to its indicator selector.
    pub fn append_row(&mut self) {
        self.form.append_row();
        let row = self.form.parameters().len() - 1;
        self.focus_on(Focus::Param {
            row,
            field: ParamField::IndicatorId,
        });
    }

    fn focused_text(&self) -> Option<&str> {
        match self.focused() {
            Focus::Scalar(field) => Some(self.form.scalar(field)),
            Focus::Param { row, field } => self.form.parameters().get(row).map(|r| r.field(field)),
            Focus::AddRow | Focus::Submit => None,
        }
    }

    fn write_focused(&mut self, value: String) {
        match self.focused() {
            Focus::Scalar(field) => self.form.set_scalar_field(field, value),
            Focus::Param { row, field } => {
                if let Err(e) = self.form.update_param_field(row, field, value) {
                    error!(error = %e, "parameter edit addressed a missing row");
                    self.push_error(ErrorCategory::Contract, e.to_string(), "parameter edit".into());
                }
            }
            Focus::AddRow | Focus::Submit => {}
        }
    }

    /// Type one character into the focused text input.
    ///
    /// Selects and buttons ignore typing. Dates accept digits and `-` up to
    /// `YYYY-MM-DD`; values accept decimal characters only.
    pub fn type_char(&mut self, c: char) {
        let focus = self.focused();
        if focus.is_select() {
            return;
        }
        let accepted = match focus {
            Focus::Scalar(ScalarField::Name) => !c.is_control(),
            Focus::Scalar(field) if field.is_date() => {
                (c.is_ascii_digit() || c == '-')
                    && self.focused_text().map_or(0, str::len) < DATE_LEN
            }
            Focus::Param {
                field: ParamField::Value,
                ..
            } => c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'),
            _ => false,
        };
        if !accepted {
            return;
        }
        if let Some(current) = self.focused_text() {
            let mut value = current.to_string();
            value.push(c);
            self.write_focused(value);
        }
    }

    /// Delete the last character of the focused text input, or clear a select.
    pub fn backspace(&mut self) {
        let focus = self.focused();
        let Some(current) = self.focused_text() else {
            return;
        };
        if current.is_empty() {
            return;
        }
        let value = if focus.is_select() {
            String::new()
        } else {
            let mut value = current.to_string();
            value.pop();
            value
        };
        self.write_focused(value);
    }

    /// Step the focused select through its catalog. Position 0 is "unset".
    pub fn cycle_select(&mut self, direction: i32) {
        let focus = self.focused();
        let (options, current): (Vec<String>, String) = match focus {
            Focus::Scalar(ScalarField::Coin) => (
                self.catalogs().coins.iter().map(|c| c.symbol.clone()).collect(),
                self.form.scalar(ScalarField::Coin).to_string(),
            ),
            Focus::Param {
                row,
                field: ParamField::IndicatorId,
            } => (
                self.catalogs()
                    .indicators
                    .iter()
                    .map(|i| i.id.as_str().to_string())
                    .collect(),
                self.form
                    .parameters()
                    .get(row)
                    .map(|r| r.indicator_id.clone())
                    .unwrap_or_default(),
            ),
            _ => return,
        };
        if options.is_empty() {
            self.set_warning("Catalog not loaded yet (Ctrl-R to reload)");
            return;
        }

        // Slot 0 is the empty choice, slots 1..=n the catalog entries.
        let slots = options.len() + 1;
        let pos = options
            .iter()
            .position(|o| *o == current)
            .map_or(0, |p| p + 1);
        let next = if direction >= 0 {
            (pos + 1) % slots
        } else {
            (pos + slots - 1) % slots
        };
        let value = if next == 0 {
            String::new()
        } else {
            options[next - 1].clone()
        };
        self.write_focused(value);
    }

    // ── Service calls ────────────────────────────────────────────────

    /// Kick off catalog loading if the current token has not been loaded yet.
    /// Nothing is fetched until a token is available.
    pub fn ensure_catalogs(&mut self) {
        if self.prompt_for_missing_token() {
            return;
        }
        if let Some(ticket) = self.loader.on_token(&self.token) {
            self.dispatch(WorkerCommand::LoadCatalogs(ticket));
            self.set_status("Loading coins and indicators...");
        }
    }

    /// Re-fetch both catalogs for the current token.
    pub fn reload_catalogs(&mut self) {
        if self.prompt_for_missing_token() {
            return;
        }
        let ticket = self.loader.reload(&self.token);
        self.dispatch(WorkerCommand::LoadCatalogs(ticket));
        self.set_status("Reloading coins and indicators...");
    }

    fn prompt_for_missing_token(&mut self) -> bool {
        if self.token.expose().is_empty() {
            self.set_warning("No bearer token: press Ctrl-T to enter one");
            return true;
        }
        false
    }

    /// Replace the bearer token; a different token reloads the catalogs.
    pub fn set_token(&mut self, token: BearerToken) {
        self.token = token;
        self.ensure_catalogs();
    }

    /// Validate at the input boundary, then hand the payload to the worker.
    pub fn try_submit(&mut self) {
        let issues = validation::check(&self.form, self.cross_field_checks);
        if let Some(first) = issues.first() {
            let target = Focus::from(first.target);
            let message = if issues.len() > 1 {
                format!("{} (+{} more)", first.message, issues.len() - 1)
            } else {
                first.message.clone()
            };
            self.set_warning(message);
            self.focus_on(target);
            return;
        }

        match self.controller.begin(&self.form) {
            Ok(request) => {
                self.dispatch(WorkerCommand::Submit {
                    token: self.token.clone(),
                    request,
                });
                self.set_status("Submitting backtest...");
            }
            Err(SubmitError::InFlight) => self.set_warning("Submission already in progress"),
            Err(e) => self.push_error(ErrorCategory::Submission, e.to_string(), String::new()),
        }
    }

    fn dispatch(&mut self, cmd: WorkerCommand) {
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Other,
                "Background worker is not running".into(),
                String::new(),
            );
        }
    }

    /// Apply one worker response on the main thread.
    pub fn apply_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Catalog(update) => match self.loader.apply(update) {
                ApplyOutcome::Replaced { kind, count } => {
                    self.set_success(format!("Loaded {count} {}", kind.label()));
                }
                ApplyOutcome::Stale { kind, generation } => {
                    debug!(catalog = kind.label(), generation, "ignored stale catalog");
                }
                ApplyOutcome::Failed { kind, error } => {
                    self.push_error(
                        ErrorCategory::Catalog,
                        format!("Error fetching {}: {error}", kind.label()),
                        format!("GET /{}", kind.label()),
                    );
                }
            },
            WorkerResponse::Submitted(outcome) => {
                match self.controller.finish(&mut self.form, outcome) {
                    Ok(created) => {
                        self.focus_idx = 0;
                        self.set_success(format!("Backtest created: {}", summarize(&created)));
                    }
                    Err(e) => {
                        self.push_error(ErrorCategory::Submission, e.to_string(), "POST /backtests".into());
                    }
                }
            }
        }
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Success));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

/// One-line description of a created record for the status bar.
fn summarize(created: &serde_json::Value) -> String {
    match created.get("id") {
        Some(id) => format!("id {id}"),
        None if created.is_null() => "no details returned".to_string(),
        None => {
            let text = created.to_string();
            if text.chars().count() > 60 {
                format!("{}...", text.chars().take(60).collect::<String>())
            } else {
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backtest_form_core::{ApiError, CatalogUpdate, Coin, Indicator};
    use std::sync::mpsc;

    fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(cmd_tx, resp_rx, BearerToken::new("tok"), false);
        (app, cmd_rx, resp_tx)
    }

    fn load_catalogs(app: &mut AppState) {
        app.ensure_catalogs();
        let generation = app.loader.generation();
        app.apply_response(WorkerResponse::Catalog(CatalogUpdate::Coins {
            generation,
            result: Ok(vec![
                Coin { id: "1".into(), symbol: "BTC".into(), name: "Bitcoin".into() },
                Coin { id: "2".into(), symbol: "ETH".into(), name: "Ether".into() },
            ]),
        }));
        app.apply_response(WorkerResponse::Catalog(CatalogUpdate::Indicators {
            generation,
            result: Ok(vec![Indicator { id: "rsi14".into(), name: "RSI 14".into() }]),
        }));
    }

    fn fill(app: &mut AppState) {
        app.form.set_scalar_field(ScalarField::Coin, "BTC");
        app.form.set_scalar_field(ScalarField::Name, "Test");
        app.form.set_scalar_field(ScalarField::StartDate, "2024-01-01");
        app.form.set_scalar_field(ScalarField::EndDate, "2024-06-01");
        app.form.update_param_field(0, ParamField::IndicatorId, "rsi14").unwrap();
        app.form.update_param_field(0, ParamField::Value, "30").unwrap();
    }

    #[test]
    fn focus_items_follow_row_count() {
        let (mut app, _rx, _tx) = app();
        assert_eq!(app.focus_items().len(), 4 + 2 + 2);
        app.append_row();
        assert_eq!(app.focus_items().len(), 4 + 4 + 2);
        assert_eq!(app.focused(), Focus::Param { row: 1, field: ParamField::IndicatorId });
    }

    #[test]
    fn focus_wraps() {
        let (mut app, _rx, _tx) = app();
        app.focus_prev();
        assert_eq!(app.focused(), Focus::Submit);
        app.focus_next();
        assert_eq!(app.focused(), Focus::Scalar(ScalarField::Coin));
    }

    #[test]
    fn typing_respects_field_kind() {
        let (mut app, _rx, _tx) = app();
        app.focus_on(Focus::Scalar(ScalarField::StartDate));
        for c in "2024-01-01X9".chars() {
            app.type_char(c);
        }
        assert_eq!(app.form.scalar(ScalarField::StartDate), "2024-01-01");

        app.focus_on(Focus::Param { row: 0, field: ParamField::Value });
        for c in "1a.5".chars() {
            app.type_char(c);
        }
        assert_eq!(app.form.parameters().get(0).unwrap().value, "1.5");
        app.backspace();
        assert_eq!(app.form.parameters().get(0).unwrap().value, "1.");
    }

    #[test]
    fn cycling_selects_walks_catalog_and_unset() {
        let (mut app, _rx, _tx) = app();
        load_catalogs(&mut app);
        app.focus_on(Focus::Scalar(ScalarField::Coin));

        app.cycle_select(1);
        assert_eq!(app.form.scalar(ScalarField::Coin), "BTC");
        app.cycle_select(1);
        assert_eq!(app.form.scalar(ScalarField::Coin), "ETH");
        app.cycle_select(1);
        assert_eq!(app.form.scalar(ScalarField::Coin), "");
        app.cycle_select(-1);
        assert_eq!(app.form.scalar(ScalarField::Coin), "ETH");

        app.focus_on(Focus::Param { row: 0, field: ParamField::IndicatorId });
        app.cycle_select(1);
        assert_eq!(app.form.parameters().get(0).unwrap().indicator_id, "rsi14");
    }

    #[test]
    fn ensure_catalogs_dispatches_once_per_token() {
        let (mut app, rx, _tx) = app();
        app.ensure_catalogs();
        app.ensure_catalogs();
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::LoadCatalogs(_))));
        assert!(rx.try_recv().is_err());

        app.set_token(BearerToken::new("other"));
        match rx.try_recv() {
            Ok(WorkerCommand::LoadCatalogs(ticket)) => assert_eq!(ticket.generation, 2),
            other => panic!("expected a load, got {other:?}"),
        }
    }

    #[test]
    fn no_catalog_requests_until_a_token_is_set() {
        let (cmd_tx, rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let mut app = AppState::new(cmd_tx, resp_rx, BearerToken::new(""), false);

        app.ensure_catalogs();
        app.reload_catalogs();
        assert!(rx.try_recv().is_err());
        assert_eq!(app.loader.generation(), 0);
        assert!(app.error_history.is_empty());
        assert!(matches!(&app.status_message, Some((msg, StatusLevel::Warning)) if msg.contains("Ctrl-T")));

        app.set_token(BearerToken::new("tok"));
        match rx.try_recv() {
            Ok(WorkerCommand::LoadCatalogs(ticket)) => {
                assert_eq!(ticket.generation, 1);
                assert_eq!(ticket.token.expose(), "tok");
            }
            other => panic!("expected a load, got {other:?}"),
        }
    }

    #[test]
    fn catalog_failure_is_recorded() {
        let (mut app, _rx, _tx) = app();
        app.ensure_catalogs();
        app.apply_response(WorkerResponse::Catalog(CatalogUpdate::Coins {
            generation: app.loader.generation(),
            result: Err(ApiError::Network("refused".into())),
        }));
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Catalog);
        assert!(app.catalogs().coins.is_empty());
    }

    #[test]
    fn incomplete_form_is_not_sent() {
        let (mut app, rx, _tx) = app();
        app.form.set_scalar_field(ScalarField::Coin, "BTC");
        app.focus_on(Focus::Submit);

        app.try_submit();

        assert!(rx.try_recv().is_err());
        assert_eq!(app.focused(), Focus::Scalar(ScalarField::Name));
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn submit_success_resets_form() {
        let (mut app, rx, _tx) = app();
        fill(&mut app);
        app.append_row();
        app.form.update_param_field(1, ParamField::IndicatorId, "ema20").unwrap();
        app.form.update_param_field(1, ParamField::Value, "2").unwrap();
        app.focus_on(Focus::Submit);

        app.try_submit();
        match rx.try_recv() {
            Ok(WorkerCommand::Submit { request, .. }) => assert_eq!(request.parameters.len(), 2),
            other => panic!("expected submit, got {other:?}"),
        }
        assert!(app.controller.is_in_flight());

        app.apply_response(WorkerResponse::Submitted(Ok(serde_json::json!({"id": 5}))));

        assert!(app.form.is_initial());
        assert_eq!(app.focused(), Focus::Scalar(ScalarField::Coin));
        assert_eq!(
            app.status_message,
            Some(("Backtest created: id 5".to_string(), StatusLevel::Success))
        );
    }

    #[test]
    fn submit_failure_keeps_form() {
        let (mut app, rx, _tx) = app();
        fill(&mut app);
        let before = app.form.clone();

        app.try_submit();
        assert!(rx.try_recv().is_ok());
        app.apply_response(WorkerResponse::Submitted(Err(ApiError::Status {
            status: 500,
            body: "oops".into(),
        })));

        assert_eq!(app.form, before);
        assert!(!app.controller.is_in_flight());
        assert_eq!(app.error_history[0].category, ErrorCategory::Submission);
    }

    #[test]
    fn double_submit_is_refused_while_in_flight() {
        let (mut app, rx, _tx) = app();
        fill(&mut app);
        app.try_submit();
        app.try_submit();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cross_field_checks_when_enabled() {
        let (mut app, rx, _tx) = app();
        app.cross_field_checks = true;
        fill(&mut app);
        app.form.set_scalar_field(ScalarField::EndDate, "2023-01-01");

        app.try_submit();

        assert!(rx.try_recv().is_err());
        assert_eq!(app.focused(), Focus::Scalar(ScalarField::EndDate));
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _rx, _tx) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn summarize_record() {
        assert_eq!(summarize(&serde_json::json!({"id": "abc"})), "id \"abc\"");
        assert_eq!(summarize(&serde_json::Value::Null), "no details returned");
        assert_eq!(summarize(&serde_json::json!({"ok": true})), "{\"ok\":true}");
    }
}

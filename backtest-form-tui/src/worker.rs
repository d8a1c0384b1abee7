//! Background worker thread: every service call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! never touches form state: it performs the blocking call and sends the raw
//! result back, and the main thread applies it between frames.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use backtest_form_core::loader::{fetch_coins_update, fetch_indicators_update};
use backtest_form_core::{ApiError, BacktestApi, BacktestRequest, BearerToken, CatalogUpdate, LoadTicket};
use tracing::debug;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    LoadCatalogs(LoadTicket),
    Submit {
        token: BearerToken,
        request: BacktestRequest,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    Catalog(CatalogUpdate),
    Submitted(Result<serde_json::Value, ApiError>),
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    api: Arc<dyn BacktestApi>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("backtest-form-worker".into())
        .spawn(move || worker_loop(api.as_ref(), rx, tx))
}

fn worker_loop(api: &dyn BacktestApi, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => handle_command(api, cmd, &tx),
        }
    }
    debug!("worker stopped");
}

fn handle_command(api: &dyn BacktestApi, cmd: WorkerCommand, tx: &Sender<WorkerResponse>) {
    match cmd {
        WorkerCommand::LoadCatalogs(ticket) => {
            debug!(generation = ticket.generation, "loading catalogs");
            // The UI may already be gone; a failed send is not an error here.
            let _ = tx.send(WorkerResponse::Catalog(fetch_coins_update(api, &ticket)));
            let _ = tx.send(WorkerResponse::Catalog(fetch_indicators_update(api, &ticket)));
        }
        WorkerCommand::Submit { token, request } => {
            let result = api.create_backtest(&token, &request);
            let _ = tx.send(WorkerResponse::Submitted(result));
        }
        WorkerCommand::Shutdown => {} // handled in loop
    }
}

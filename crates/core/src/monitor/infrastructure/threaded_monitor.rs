use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, Receiver};
use thiserror::Error;

use crate::monitor::guard_session::GuardSession;
use crate::monitor::session_stats::SessionStats;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("monitoring thread panicked")]
    WorkerPanicked,
    #[error("failed to start monitoring thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs the session on the calling thread until `interrupt` fires.
///
/// Used when a preview surface is enabled so rendering stays on one thread.
pub fn run_in_foreground(
    mut session: GuardSession,
    interval: Duration,
    interrupt: &Receiver<()>,
) -> SessionStats {
    session.run(interrupt, interval);
    session.shutdown()
}

/// Runs the session on a dedicated thread while the caller supervises.
///
/// The supervisor waits on both the operator interrupt and the worker's
/// completion, forwards the interrupt as a stop request, then joins the
/// worker. Shutdown happens on the worker so the camera is released by the
/// thread that used it.
pub fn run_in_background(
    mut session: GuardSession,
    interval: Duration,
    interrupt: &Receiver<()>,
) -> Result<SessionStats, MonitorError> {
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);

    let worker = thread::Builder::new()
        .name("privacy-guard-monitor".to_string())
        .spawn(move || {
            session.run(&stop_rx, interval);
            let stats = session.shutdown();
            let _ = done_tx.send(());
            stats
        })?;

    select! {
        recv(interrupt) -> _ => {
            log::info!("Interrupt received, stopping monitor");
            let _ = stop_tx.send(());
        }
        recv(done_rx) -> _ => {
            log::debug!("Monitor finished on its own");
        }
    }
    drop(stop_tx);

    worker.join().map_err(|_| MonitorError::WorkerPanicked)
}

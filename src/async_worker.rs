use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use lexis_core::RefreshOutcome;
use lexis_session::{Pager, PagingError};
use tracing::debug;

// ---------------------------------------------------------------------------
// Work / Result types
// ---------------------------------------------------------------------------

pub(crate) struct RefreshWork {
    pub pager: Arc<Pager>,
    pub generation: u64,
}

#[derive(Debug)]
pub struct RefreshResult {
    pub generation: u64,
    pub outcome: Result<RefreshOutcome, PagingError>,
}

// ---------------------------------------------------------------------------
// RefreshWorker
// ---------------------------------------------------------------------------

/// Background thread that rebuilds the ordering cache after configuration
/// changes. Only the newest queued request runs; the pager's generation
/// counter discards the rest.
pub(crate) struct RefreshWorker {
    work_tx: mpsc::Sender<RefreshWork>,
    result_rx: Mutex<mpsc::Receiver<RefreshResult>>,
}

impl RefreshWorker {
    pub fn spawn() -> std::io::Result<Self> {
        let (work_tx, work_rx) = mpsc::channel::<RefreshWork>();
        let (result_tx, result_rx) = mpsc::channel::<RefreshResult>();
        thread::Builder::new()
            .name("lexis-refresh".into())
            .spawn(move || refresh_worker(work_rx, result_tx))?;
        Ok(Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
        })
    }

    pub fn submit(&self, pager: Arc<Pager>, generation: u64) {
        let _ = self.work_tx.send(RefreshWork { pager, generation });
    }

    pub fn try_recv(&self) -> Option<RefreshResult> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn refresh_worker(rx: mpsc::Receiver<RefreshWork>, tx: mpsc::Sender<RefreshResult>) {
    while let Ok(work) = rx.recv() {
        // Drain: if multiple work items queued, skip to latest
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        // Check staleness before doing work
        if !latest.pager.is_current(latest.generation) {
            debug!(generation = latest.generation, "dropped stale refresh");
            continue;
        }

        let outcome = latest.pager.complete_refresh(latest.generation);

        // Superseded results are of no interest to the caller
        if matches!(outcome, Ok(RefreshOutcome::Superseded)) {
            continue;
        }

        let _ = tx.send(RefreshResult {
            generation: latest.generation,
            outcome,
        });
    }
}

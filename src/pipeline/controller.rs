use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::errors::AppResult;
use crate::geocoding::Geocode;
use crate::pipeline::{CancellationToken, Pipeline, RunObserver, RunReport};
use crate::scraping::PageSource;

/// Owns the single background worker. At most one run is in flight; the
/// host keeps its own thread and talks to the run only through `stop`.
#[derive(Clone, Default)]
pub struct ScrapeController {
    active: Arc<AtomicBool>,
    token: Arc<Mutex<CancellationToken>>,
}

/// Clears the active flag when the worker exits, panics included.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ScrapeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the worker. Returns `None` and does nothing if a run is already active.
    pub fn start<S, G, O>(
        &self,
        pipeline: Pipeline<S, G>,
        observer: O,
    ) -> Option<JoinHandle<AppResult<RunReport>>>
    where
        S: PageSource + Send + 'static,
        G: Geocode + Send + 'static,
        O: RunObserver + Send + 'static,
    {
        // Held until the new token is installed, so a concurrent `stop` cannot hit the old one.
        let mut current = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("scrape already running, ignoring start");
            return None;
        }

        let token = CancellationToken::new();
        *current = token.clone();
        drop(current);

        let guard = ActiveGuard(Arc::clone(&self.active));
        let handle = thread::spawn(move || {
            let _guard = guard;
            info!("scrape worker started");

            let result = pipeline.run(&token, &observer);
            match &result {
                Ok(report) => info!(outcome = ?report.outcome, "scrape worker finished"),
                Err(e) => error!(error = %e, "scrape worker failed"),
            }
            result
        });

        Some(handle)
    }

    /// Ask the active run to stop at its next yield point. No-op when idle.
    pub fn stop(&self) {
        if self.is_running() {
            info!("stop requested");
            self.token
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

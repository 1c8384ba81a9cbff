/// The two hooks a host (CLI, UI, test) gives the pipeline.
///
/// Calls come from the worker thread. `total` changes meaning with the stage:
/// pages while fetching, rows while geocoding.
pub trait RunObserver {
    fn on_progress(&self, completed: usize, total: usize);

    /// Polled at every yield point; returning true stops the run there.
    fn on_cancel_requested(&self) -> bool;
}

/// Host that never cancels and ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_progress(&self, _completed: usize, _total: usize) {}

    fn on_cancel_requested(&self) -> bool {
        false
    }
}

impl<T: RunObserver + ?Sized> RunObserver for std::sync::Arc<T> {
    fn on_progress(&self, completed: usize, total: usize) {
        (**self).on_progress(completed, total)
    }

    fn on_cancel_requested(&self) -> bool {
        (**self).on_cancel_requested()
    }
}

mod cancel;
mod controller;
mod observer;
mod report;
mod runner;

pub use cancel::CancellationToken;
pub use controller::ScrapeController;
pub use observer::{NoopObserver, RunObserver};
pub use report::{Outcome, RunReport};
pub use runner::Pipeline;

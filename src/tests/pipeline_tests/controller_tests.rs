// src/tests/pipeline_tests/controller_tests.rs
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use scraper::Html;

use crate::pipeline::{NoopObserver, Outcome, Pipeline, ScrapeController};
use crate::scraping::{PageSource, ScraperError};
use crate::tests::utils::{listing_page, test_config, BuildingFixture, FixedGeocoder};

const TEMPLATE: &str = "https://suumo.test/ichiran?page={page}";

/// Holds every fetch until the test lets it through.
struct GatedPages {
    gate: Mutex<Receiver<()>>,
    started: Sender<()>,
}

impl PageSource for GatedPages {
    fn fetch(&self, _url: &str) -> Result<Html, ScraperError> {
        let _ = self.started.send(());
        let _ = self.gate.lock().unwrap().recv();
        Ok(Html::parse_document(&listing_page(&[BuildingFixture::new(
            "天神ハイツ",
            "福岡市中央区天神1",
        )])))
    }
}

fn gated_pipeline(
    dir: &std::path::Path,
) -> (Pipeline<GatedPages, FixedGeocoder>, Sender<()>, Receiver<()>) {
    let (open, gate) = mpsc::channel();
    let (started, fetching) = mpsc::channel();
    let pages = GatedPages {
        gate: Mutex::new(gate),
        started,
    };
    let pipeline =
        Pipeline::new(test_config(dir, TEMPLATE, 3), pages, FixedGeocoder::default()).unwrap();
    (pipeline, open, fetching)
}

#[test]
fn a_second_start_while_running_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let controller = ScrapeController::new();

    let (first, open, fetching) = gated_pipeline(dir.path());
    let handle = controller.start(first, NoopObserver).unwrap();
    fetching.recv().unwrap();
    assert!(controller.is_running());

    let (second, _open2, _fetching2) = gated_pipeline(dir.path());
    assert!(controller.start(second, NoopObserver).is_none());

    controller.stop();
    open.send(()).unwrap();
    let report = handle.join().unwrap().unwrap();

    // The in-flight page finishes; the token stops extraction before its first building.
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.pages_requested, 1);
    assert_eq!(report.raw_listings, 0);
    assert!(!controller.is_running());
}

#[test]
fn a_finished_run_frees_the_controller() {
    let dir = tempfile::tempdir().unwrap();
    let controller = ScrapeController::new();

    let (first, open, _fetching) = gated_pipeline(dir.path());
    for _ in 0..3 {
        open.send(()).unwrap();
    }
    let report = controller
        .start(first, NoopObserver)
        .unwrap()
        .join()
        .unwrap()
        .unwrap();
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.pages_fetched, 3);
    assert!(!controller.is_running());

    let (second, open, _fetching) = gated_pipeline(dir.path());
    for _ in 0..3 {
        open.send(()).unwrap();
    }
    let again = controller.start(second, NoopObserver).unwrap();
    assert!(again.join().unwrap().is_ok());
}

#[test]
fn stop_reaches_the_run_started_after_an_earlier_one() {
    let dir = tempfile::tempdir().unwrap();
    let controller = ScrapeController::new();

    let (first, open, _fetching) = gated_pipeline(dir.path());
    for _ in 0..3 {
        open.send(()).unwrap();
    }
    let report = controller
        .start(first, NoopObserver)
        .unwrap()
        .join()
        .unwrap()
        .unwrap();
    assert_eq!(report.outcome, Outcome::Completed);

    let (second, open, fetching) = gated_pipeline(dir.path());
    let handle = controller.start(second, NoopObserver).unwrap();
    fetching.recv().unwrap();
    controller.stop();
    open.send(()).unwrap();

    let report = handle.join().unwrap().unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.pages_requested, 1);
}

#[test]
fn stop_while_idle_does_nothing() {
    let controller = ScrapeController::new();
    controller.stop();
    assert!(!controller.is_running());
}

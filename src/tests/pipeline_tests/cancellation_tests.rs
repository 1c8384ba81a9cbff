// src/tests/pipeline_tests/cancellation_tests.rs
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::GeoPoint;
use crate::errors::AppError;
use crate::pipeline::{CancellationToken, NoopObserver, Outcome, Pipeline, RunObserver};
use crate::tests::utils::{
    listing_page, test_config, BuildingFixture, FixedGeocoder, RecordingObserver, StaticPages,
    UnitFixture,
};

const TEMPLATE: &str = "https://suumo.test/ichiran?page={page}";

fn page_url(page: u32) -> String {
    TEMPLATE.replace("{page}", &page.to_string())
}

fn page_with(name: &str, address: &str) -> String {
    let mut b = BuildingFixture::new(name, address);
    b.units = vec![UnitFixture::new("1階", "5万円", &format!("/chintai/{name}/"))];
    listing_page(&[b])
}

fn three_pages() -> StaticPages {
    StaticPages::default()
        .with_page(&page_url(1), page_with("天神ハイツ", "福岡市中央区天神1"))
        .with_page(&page_url(2), page_with("博多コーポ", "福岡市博多区博多駅前2"))
        .with_page(&page_url(3), page_with("姪浜荘", "福岡市西区姪浜3"))
}

fn geocoder() -> FixedGeocoder {
    FixedGeocoder::default()
        .with_point("福岡市中央区天神1", GeoPoint::new(130.3987, 33.5911))
        .with_point("福岡市博多区博多駅前2", GeoPoint::new(130.4206, 33.5897))
        .with_point("福岡市西区姪浜3", GeoPoint::new(130.3240, 33.5840))
}

#[test]
fn cancelling_after_the_first_page_still_exports_it() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 3);
    let csv_path = config.output.csv_path.clone();
    let map_path = config.output.map_path.clone();
    let observer = RecordingObserver {
        cancel_at_progress: Some(1),
        ..Default::default()
    };

    let pages = three_pages();
    let geocoder = geocoder();

    let pipeline = Pipeline::new(config, &pages, &geocoder).unwrap();
    let token = CancellationToken::new();
    let report = pipeline.run(&token, &observer).unwrap();

    assert!(token.is_cancelled());
    assert_eq!(pages.requested(), vec![page_url(1)]);
    assert!(geocoder.called().is_empty());
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.rows, 1);
    assert_eq!(report.not_attempted, 1);
    assert_eq!(report.markers, 0);

    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("天神ハイツ"));
    assert!(!text.contains("博多コーポ"));
    assert!(map_path.exists());
}

#[test]
fn cancelling_mid_geocoding_leaves_the_rest_not_attempted() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 3);
    let csv_path = config.output.csv_path.clone();
    let token = CancellationToken::new();
    let geocoder = geocoder().cancel_after(1, token.clone());

    let report = Pipeline::new(config, three_pages(), geocoder)
        .unwrap()
        .run(&token, &NoopObserver)
        .unwrap();

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.rows, 3);
    assert_eq!((report.geocoded, report.not_attempted), (1, 2));
    assert_eq!(report.markers, 1);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][15], "130.3987");
    assert_eq!((&rows[2][15], &rows[2][16]), ("", ""));
}

#[test]
fn a_failed_page_is_skipped_and_the_rest_continue() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 3);
    let pages = StaticPages::default()
        .with_page(&page_url(1), page_with("天神ハイツ", "福岡市中央区天神1"))
        .with_page(&page_url(3), page_with("姪浜荘", "福岡市西区姪浜3"));
    let geocoder = geocoder();

    let pipeline = Pipeline::new(config, &pages, &geocoder).unwrap();
    let report = pipeline.run(&CancellationToken::new(), &NoopObserver).unwrap();

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.pages_requested, 3);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.failed_pages, vec![2]);
    assert_eq!(report.rows, 2);
    assert_eq!(report.markers, 2);
    assert_eq!(
        geocoder.called(),
        vec!["福岡市中央区天神1".to_string(), "福岡市西区姪浜3".to_string()]
    );
}

#[test]
fn unresolved_addresses_are_kept_but_not_mapped() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 3);
    let geocoder = FixedGeocoder::default()
        .with_point("福岡市中央区天神1", GeoPoint::new(130.3987, 33.5911));

    let report = Pipeline::new(config, three_pages(), geocoder)
        .unwrap()
        .run(&CancellationToken::new(), &NoopObserver)
        .unwrap();

    assert_eq!(report.rows, 3);
    assert_eq!((report.geocoded, report.unresolved), (1, 2));
    assert_eq!(report.markers, 1);
}

#[test]
fn progress_is_reported_for_pages_then_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 3);
    let observer = RecordingObserver::default();

    Pipeline::new(config, three_pages(), geocoder())
        .unwrap()
        .run(&CancellationToken::new(), &observer)
        .unwrap();

    let progress = observer.progress.lock().unwrap().clone();
    assert_eq!(
        progress,
        vec![(1, 3), (2, 3), (3, 3), (1, 3), (2, 3), (3, 3)]
    );
}

#[test]
fn a_failed_write_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), TEMPLATE, 1);
    config.output.csv_path = dir.path().join("missing").join("listings.csv");

    let err = Pipeline::new(config, three_pages(), geocoder())
        .unwrap()
        .run(&CancellationToken::new(), &NoopObserver)
        .unwrap_err();

    assert!(matches!(err, AppError::Persistence { .. }));
}

/// Host whose stop button is pressed after it has been asked `allowed` times.
struct StopAfterPolls {
    polls: AtomicUsize,
    allowed: usize,
}

impl RunObserver for StopAfterPolls {
    fn on_progress(&self, _completed: usize, _total: usize) {}

    fn on_cancel_requested(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst) >= self.allowed
    }
}

#[test]
fn the_host_hook_is_polled_between_buildings() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 1);
    let page = listing_page(&[
        BuildingFixture::new("天神ハイツ", "福岡市中央区天神1"),
        BuildingFixture::new("博多コーポ", "福岡市博多区博多駅前2"),
        BuildingFixture::new("姪浜荘", "福岡市西区姪浜3"),
    ]);
    let pages = StaticPages::default().with_page(&page_url(1), page);
    // First poll is before the page, second before the first building.
    let observer = StopAfterPolls {
        polls: AtomicUsize::new(0),
        allowed: 2,
    };

    let report = Pipeline::new(config, &pages, geocoder())
        .unwrap()
        .run(&CancellationToken::new(), &observer)
        .unwrap();

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.raw_listings, 1);
    assert_eq!(report.rows, 1);
}

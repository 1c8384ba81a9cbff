// src/tests/pipeline_tests/placement_tests.rs
use crate::domain::GeoPoint;
use crate::pipeline::{CancellationToken, NoopObserver, Pipeline};
use crate::tests::utils::{listing_page, test_config, BuildingFixture, FixedGeocoder, StaticPages};

const TEMPLATE: &str = "https://suumo.test/ichiran?page={page}";

#[test]
fn coincident_addresses_are_exported_at_their_spread_positions() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), TEMPLATE, 1);
    let max_offset = config.jitter.max_offset;
    let csv_path = config.output.csv_path.clone();

    let mut second = BuildingFixture::new("天神コーポ", "福岡市中央区天神1-2");
    second.units[0].href = Some("/chintai/jnc_000000000009/".to_string());
    let page = listing_page(&[BuildingFixture::new("天神ハイツ", "福岡市中央区天神1-1"), second]);
    let pages = StaticPages::default().with_page(
        &TEMPLATE.replace("{page}", "1"),
        page,
    );
    // Two addresses, one building lot.
    let spot = GeoPoint::new(130.4, 33.6);
    let geocoder = FixedGeocoder::default()
        .with_point("福岡市中央区天神1-1", spot)
        .with_point("福岡市中央区天神1-2", spot);

    let report = Pipeline::new(config, pages, geocoder)
        .unwrap()
        .run(&CancellationToken::new(), &NoopObserver)
        .unwrap();
    assert_eq!((report.rows, report.markers), (2, 2));

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    let position = |row: &csv::StringRecord| -> (f64, f64) {
        (row[15].parse().unwrap(), row[16].parse().unwrap())
    };

    let first = position(&rows[0]);
    let moved = position(&rows[1]);
    assert_eq!(first, (130.4, 33.6));
    assert_ne!(moved, first);
    // Two points share the spot, so each axis moves by less than twice the offset.
    assert!((moved.0 - spot.longitude).abs() < max_offset * 2.0);
    assert!((moved.1 - spot.latitude).abs() < max_offset * 2.0);
}

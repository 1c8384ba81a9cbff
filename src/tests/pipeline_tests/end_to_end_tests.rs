// src/tests/pipeline_tests/end_to_end_tests.rs
use crate::pipeline::{CancellationToken, NoopObserver, Outcome, Pipeline};
use crate::spreadsheets::HEADERS;
use crate::tests::utils::{listing_page, test_config, BuildingFixture, UnitFixture};
use httptest::matchers::{all_of, contains, request, url_decoded};
use httptest::responders::{json_encoded, status_code};
use httptest::{Expectation, Server};
use serde_json::json;

const TENJIN: &str = "福岡県福岡市中央区天神1";
const HAKATA: &str = "福岡県福岡市博多区博多駅前2";

fn building(name: &str, address: &str, hrefs: [&str; 2]) -> BuildingFixture {
    let mut b = BuildingFixture::new(name, address);
    b.units = vec![
        UnitFixture::new("2階", "6.5万円", hrefs[0]),
        UnitFixture::new("5階", "7万円", hrefs[1]),
    ];
    b
}

fn serve_listing_pages(server: &Server) {
    let pages = [
        ("1", building("天神ハイツ", TENJIN, ["/chintai/jnc_1/", "/chintai/jnc_2/"])),
        ("2", building("博多コーポ", HAKATA, ["/chintai/jnc_3/", "/chintai/jnc_4/"])),
    ];
    for (page, fixture) in pages {
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/ichiran"),
                request::query(url_decoded(contains(("page", page)))),
            ])
            .times(1)
            .respond_with(
                status_code(200)
                    .append_header("content-type", "text/html; charset=utf-8")
                    .body(listing_page(&[fixture])),
            ),
        );
    }
}

fn serve_geocoders(server: &Server) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/address-search/AddressSearch"),
            request::query(url_decoded(contains(("q", TENJIN)))),
        ])
        .times(1)
        .respond_with(json_encoded(json!([
            { "geometry": { "coordinates": [130.3987, 33.5911], "type": "Point" }, "type": "Feature" }
        ]))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/address-search/AddressSearch"),
            request::query(url_decoded(contains(("q", HAKATA)))),
        ])
        .times(1)
        .respond_with(json_encoded(json!([]))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/zipcoda/api"),
            request::query(url_decoded(contains(("address", HAKATA)))),
        ])
        .times(1)
        .respond_with(json_encoded(json!({ "items": [ { "zipcode": "8120012" } ] }))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/heartrails/api/json"),
            request::query(url_decoded(contains(("postal", "8120012")))),
        ])
        .times(1)
        .respond_with(json_encoded(json!({
            "response": { "location": [ { "x": "130.4206", "y": "33.5897" } ] }
        }))),
    );
}

#[test]
fn two_pages_become_a_deduplicated_table_and_a_clustered_map() {
    let server = Server::run();
    serve_listing_pages(&server);
    serve_geocoders(&server);

    let dir = tempfile::tempdir().unwrap();
    let template = format!("{}?page={{page}}", server.url("/ichiran"));
    let mut config = test_config(dir.path(), &template, 2);
    config.geocoder.address_search_url = server.url("/address-search/AddressSearch").to_string();
    config.geocoder.postal_lookup_url = server.url("/zipcoda/api").to_string();
    config.geocoder.postal_geocode_url = server.url("/heartrails/api/json").to_string();
    let csv_path = config.output.csv_path.clone();
    let map_path = config.output.map_path.clone();

    let report = Pipeline::from_config(config)
        .unwrap()
        .run(&CancellationToken::new(), &NoopObserver)
        .unwrap();

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!((report.pages_requested, report.pages_fetched), (2, 2));
    assert!(report.failed_pages.is_empty());
    assert_eq!(report.raw_listings, 4);
    // One unit per building survives the name pass.
    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(report.rows, 2);
    assert_eq!((report.geocoded, report.unresolved, report.not_attempted), (2, 0, 0));
    assert_eq!(report.markers, 2);
    assert_eq!(report.outputs, vec![csv_path.clone(), map_path.clone()]);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), HEADERS.len());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "天神ハイツ");
    assert_eq!(&rows[0][7], "2階");
    assert!(rows[0][14].ends_with("/chintai/jnc_1/"));
    assert_eq!((&rows[0][15], &rows[0][16]), ("130.3987", "33.5911"));
    assert_eq!(&rows[1][0], "博多コーポ");
    assert_eq!((&rows[1][15], &rows[1][16]), ("130.4206", "33.5897"));

    let page = std::fs::read_to_string(&map_path).unwrap();
    assert!(page.contains("L.markerClusterGroup()"));
    assert!(page.contains("天神ハイツ"));
    assert!(page.contains("博多コーポ"));
}

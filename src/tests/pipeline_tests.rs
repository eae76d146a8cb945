// src/tests/pipeline_tests.rs
use super::utils::{collection, line, mock_listings, mock_token, pipeline, square};
use crate::domain::DropReason;
use crate::errors::PipelineError;
use crate::geos::{ReferenceLoadError, Utm};
use crate::pipeline::Stage;
use crate::progress::NullProgress;
use crate::source::SourceError;
use crate::spreadsheets::deals_to_csv_string;
use geo::Coord;
use mockito::Server;
use serde_json::{json, Value};

const R1: (f64, f64) = (-118.30, 34.05);
const UNZONED: (f64, f64) = (-118.55, 34.25);

fn land(key: &str, price: f64, lot: f64, (lon, lat): (f64, f64)) -> Value {
    json!({
        "ListingKey": key,
        "MlsStatus": "Active",
        "ListPrice": price,
        "StreetNumber": "123",
        "StreetName": "Main St",
        "City": "Los Angeles",
        "Longitude": lon,
        "Latitude": lat,
        "LotSizeSquareFeet": lot,
        "PropertyType": "Land",
        "DaysOnMarket": 12
    })
}

fn zoning_layer() -> tempfile::NamedTempFile {
    collection(vec![
        square(R1.0, R1.1, 0.05, json!("R1-1")),
        square(UNZONED.0, UNZONED.1, 0.05, Value::Null),
    ])
}

fn no_coast() -> tempfile::NamedTempFile {
    collection(vec![line(&[(-119.0, 33.5), (-118.9, 33.5)])])
}

#[test]
fn development_run_ranks_only_priced_zoned_parcels() {
    let mut server = Server::new();
    mock_token(&mut server);
    mock_listings(
        &mut server,
        vec![
            land("a", 500_000.0, 10_000.0, R1),
            land("b", 40_000.0, 10_000.0, R1),
            land("c", 100_000.0, 5_000.0, UNZONED),
        ],
    );
    let (zoning, coast) = (zoning_layer(), no_coast());

    let out = pipeline(&server, &zoning, &coast)
        .run_development(&mut NullProgress)
        .unwrap();

    let rows = &out.ranking.rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].listing.id, "a");
    assert_eq!(rows[0].base_zone_code, "R1");
    assert_eq!(rows[0].min_land_per_unit, 5_000);
    assert_eq!(rows[0].max_units, 2);
    assert_eq!(rows[0].price_per_unit, 250_000);

    let report = &out.report;
    assert_eq!(report.rows_at(Stage::Raw), Some(3));
    assert_eq!(report.rows_at(Stage::Cleaned), Some(2));
    assert_eq!(report.rows_at(Stage::Joined), Some(2));
    assert_eq!(report.dropped.get(DropReason::BelowMinPrice), 1);
    // (c) lands in the unlabelled zone: NOZONING at 1,000 sqft/unit gives
    // 5 units at 20,000 each, under the floor.
    assert_eq!(report.dropped.get(DropReason::BelowMinPricePerUnit), 1);

    let csv = deals_to_csv_string(rows);
    assert_eq!(
        csv.lines().nth(1),
        Some("123 Main St Los Angeles,500000,2,250k,12,R1-1,5000,R1")
    );
}

#[test]
fn unlabelled_zone_uses_default_density() {
    let mut server = Server::new();
    mock_token(&mut server);
    mock_listings(&mut server, vec![land("c", 300_000.0, 5_000.0, UNZONED)]);
    let (zoning, coast) = (zoning_layer(), no_coast());

    let out = pipeline(&server, &zoning, &coast)
        .run_development(&mut NullProgress)
        .unwrap();

    let deal = &out.ranking.rows[0];
    assert_eq!(deal.zoning_label, None);
    assert_eq!(deal.base_zone_code, "NOZONING");
    assert_eq!(deal.min_land_per_unit, 1_000);
    assert_eq!(deal.max_units, 5);
    assert_eq!(deal.price_per_unit, 60_000);
}

fn income(key: &str, price: f64, (lon, lat): (f64, f64)) -> Value {
    json!({
        "ListingKey": key,
        "ListPrice": price,
        "StreetNumber": "9",
        "StreetName": "Ocean Ave",
        "City": "Long Beach",
        "Longitude": lon,
        "Latitude": lat,
        "NumberOfUnitsTotal": 4,
        "BuildingAreaTotal": 4_400,
        "BedroomsTotal": 6,
        "ParkingTotal": 4,
        "YearBuilt": 1962
    })
}

#[test]
fn apartment_run_applies_coastal_caps() {
    let utm = Utm::default();
    let at = |x: f64, y: f64| {
        let c = utm.inverse(Coord { x, y });
        (c.x, c.y)
    };

    let coast = collection(vec![line(&[at(380_000.0, 3_740_000.0), at(400_000.0, 3_740_000.0)])]);
    let zoning = zoning_layer();

    let mut server = Server::new();
    mock_token(&mut server);
    mock_listings(
        &mut server,
        vec![
            // 500 m out: 500k per unit is under the 600k near-coast cap.
            income("near", 2_000_000.0, at(390_000.0, 3_740_500.0)),
            // 3 km out: 550k per unit is over the 500k inland cap.
            income("pricey", 2_200_000.0, at(390_000.0, 3_743_000.0)),
            income("inland", 1_600_000.0, at(390_000.0, 3_743_000.0)),
        ],
    );

    let out = pipeline(&server, &zoning, &coast)
        .run_apartment(&mut NullProgress)
        .unwrap();

    let ids: Vec<_> = out.ranking.rows.iter().map(|d| d.listing.id.as_str()).collect();
    assert_eq!(ids, vec!["inland", "near"]);

    let near = &out.ranking.rows[1];
    assert!(near.near_coast);
    assert_eq!(near.max_allowed_price_per_unit, 600_000);
    assert!((near.distance_to_coast_m - 500.0).abs() < 0.01);

    assert_eq!(out.report.dropped.get(DropReason::AboveCap), 1);
    assert_eq!(out.ranking.total_matches, 2);
}

#[test]
fn auth_failure_stops_before_any_fetch() {
    let mut server = Server::new();
    server
        .mock("POST", "/token")
        .with_status(401)
        .with_body("bad credentials")
        .create();
    let listings = server
        .mock("GET", "/odata/Property")
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create();
    let (zoning, coast) = (zoning_layer(), no_coast());

    let err = pipeline(&server, &zoning, &coast)
        .run_development(&mut NullProgress)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Source(SourceError::Auth { status: 401, .. })));
    listings.assert();
}

#[test]
fn failed_page_discards_the_run() {
    let mut server = Server::new();
    mock_token(&mut server);
    server
        .mock("GET", "/odata/Property")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body("upstream exploded")
        .create();
    let (zoning, coast) = (zoning_layer(), no_coast());

    let err = pipeline(&server, &zoning, &coast)
        .run_development(&mut NullProgress)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Source(SourceError::Fetch { status: 500, .. })));
}

#[test]
fn unreadable_layer_aborts_the_run() {
    let mut server = Server::new();
    let token = server.mock("POST", "/token").expect(0).create();
    let zoning = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(zoning.path(), "{ not geojson").unwrap();
    let coast = no_coast();

    let err = pipeline(&server, &zoning, &coast)
        .run_development(&mut NullProgress)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Reference(ReferenceLoadError::Json(_))));
    token.assert();
}

#[test]
fn ranked_output_is_capped() {
    let mut server = Server::new();
    mock_token(&mut server);
    let records: Vec<Value> = (0..800)
        .map(|i| land(&format!("k{i}"), 100_000.0 + i as f64 * 1_000.0, 10_000.0, R1))
        .collect();
    mock_listings(&mut server, records);
    let (zoning, coast) = (zoning_layer(), no_coast());

    let out = pipeline(&server, &zoning, &coast)
        .run_development(&mut NullProgress)
        .unwrap();

    assert_eq!(out.ranking.total_matches, 800);
    assert_eq!(out.ranking.rows.len(), 750);
    assert_eq!(out.ranking.rows[0].listing.id, "k0");
    assert!(out
        .ranking
        .rows
        .windows(2)
        .all(|w| w[0].price_per_unit <= w[1].price_per_unit));
}

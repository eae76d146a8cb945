// src/tests/utils.rs
use crate::geos::{LayerLocation, LayerSources, ReferenceLayers, SystemClock};
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::source::{Credentials, ListingSource, SourceSettings};
use mockito::{Mock, Server};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

/// A square polygon feature centred on `(lon, lat)`, `half` degrees each way.
pub fn square(lon: f64, lat: f64, half: f64, label: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": { "Zoning": label },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [lon - half, lat - half],
                [lon + half, lat - half],
                [lon + half, lat + half],
                [lon - half, lat + half],
                [lon - half, lat - half]
            ]]
        }
    })
}

pub fn line(coords: &[(f64, f64)]) -> Value {
    let coordinates: Vec<[f64; 2]> = coords.iter().map(|&(x, y)| [x, y]).collect();
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": { "type": "LineString", "coordinates": coordinates }
    })
}

pub fn collection(features: Vec<Value>) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let body = json!({ "type": "FeatureCollection", "features": features });
    file.write_all(body.to_string().as_bytes()).unwrap();
    file
}

/// Token endpoint answering with `tok`.
pub fn mock_token(server: &mut Server) -> Mock {
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token":"tok","token_type":"Bearer"}"#)
        .create()
}

/// One-page listing response.
pub fn mock_listings(server: &mut Server, records: Vec<Value>) -> Mock {
    server
        .mock("GET", "/odata/Property")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(json!({ "value": records }).to_string())
        .create()
}

pub fn pipeline(server: &Server, zoning: &NamedTempFile, coast: &NamedTempFile) -> Pipeline {
    let mut settings = SourceSettings::new(
        format!("{}/token", server.url()),
        format!("{}/odata", server.url()),
        Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            scope: "api".into(),
        },
    );
    settings.backoff = Duration::ZERO;

    let layers = ReferenceLayers::new(
        LayerSources {
            zoning: LayerLocation::File(zoning.path().to_path_buf()),
            zoning_label_property: "Zoning".into(),
            coastline: LayerLocation::File(coast.path().to_path_buf()),
        },
        chrono::Duration::hours(24),
        Arc::new(SystemClock),
        reqwest::blocking::Client::new(),
    );

    Pipeline::new(
        ListingSource::new(settings).unwrap(),
        Arc::new(layers),
        PipelineSettings::default(),
    )
}

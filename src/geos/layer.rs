// geos/layer.rs
use crate::geos::{ReferenceLoadError, Utm};
use geo::{BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Where a reference layer lives: a local file or an http(s) URL.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerLocation {
    File(PathBuf),
    Url(String),
}

impl LayerLocation {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            LayerLocation::Url(s.to_string())
        } else {
            LayerLocation::File(PathBuf::from(s))
        }
    }

    pub fn read_to_string(&self, client: &Client) -> Result<String, ReferenceLoadError> {
        match self {
            LayerLocation::File(path) => Ok(std::fs::read_to_string(path)?),
            LayerLocation::Url(url) => {
                let resp = client.get(url).send()?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(ReferenceLoadError::Http {
                        status: status.as_u16(),
                    });
                }
                Ok(resp.text()?)
            }
        }
    }
}

impl fmt::Display for LayerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerLocation::File(path) => write!(f, "{}", path.display()),
            LayerLocation::Url(url) => f.write_str(url),
        }
    }
}

/// One polygon of the zoning layer with its free-text label.
#[derive(Debug, Clone)]
pub struct ZonePolygon {
    pub geometry: Polygon<f64>,
    pub bbox: Rect<f64>,
    pub zoning_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ZoningLayer {
    pub polygons: Vec<ZonePolygon>,
}

impl ZoningLayer {
    /// Reads polygon features, taking the zoning label from `label_property`.
    /// MultiPolygons are split into their parts, which share the label.
    pub fn from_geojson(text: &str, label_property: &str) -> Result<Self, ReferenceLoadError> {
        let collection = FeatureCollection::parse(text)?;
        let crs = collection.crs()?;
        let mut polygons = Vec::new();

        for (feature_index, feature) in collection.features.iter().enumerate() {
            let Some(geometry) = &feature.geometry else {
                continue;
            };

            let parts = match geometry {
                GeometryJson::Polygon { coordinates } => {
                    vec![polygon(coordinates, crs, feature_index)?]
                }
                GeometryJson::MultiPolygon { coordinates } => coordinates
                    .iter()
                    .map(|p| polygon(p, crs, feature_index))
                    .collect::<Result<Vec<_>, _>>()?,
                _ => {
                    tracing::warn!(feature = feature_index, "skipping non-polygon zoning feature");
                    continue;
                }
            };

            let zoning_label = feature.property_text(label_property);

            for geometry in parts {
                let Some(bbox) = geometry.bounding_rect() else {
                    continue;
                };
                polygons.push(ZonePolygon {
                    geometry,
                    bbox,
                    zoning_label: zoning_label.clone(),
                });
            }
        }

        if polygons.is_empty() {
            return Err(ReferenceLoadError::Empty("zoning".into()));
        }

        Ok(Self { polygons })
    }

    /// Never zero: an empty layer fails to load.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }
}

/// The land/water boundary, in geographic coordinates.
#[derive(Debug, Clone)]
pub struct CoastlineLayer {
    pub boundary: Vec<LineString<f64>>,
    pub feature_count: usize,
}

impl CoastlineLayer {
    /// Polygon features are merged and their outline kept; line features are
    /// taken as boundary already.
    pub fn from_geojson(text: &str) -> Result<Self, ReferenceLoadError> {
        let collection = FeatureCollection::parse(text)?;
        let crs = collection.crs()?;
        let mut land = Vec::new();
        let mut boundary = Vec::new();
        let mut feature_count = 0;

        for (feature_index, feature) in collection.features.iter().enumerate() {
            let Some(geometry) = &feature.geometry else {
                continue;
            };

            match geometry {
                GeometryJson::Polygon { coordinates } => {
                    land.push(polygon(coordinates, crs, feature_index)?);
                }
                GeometryJson::MultiPolygon { coordinates } => {
                    for p in coordinates {
                        land.push(polygon(p, crs, feature_index)?);
                    }
                }
                GeometryJson::LineString { coordinates } => {
                    boundary.push(line(coordinates, crs, feature_index)?);
                }
                GeometryJson::MultiLineString { coordinates } => {
                    for l in coordinates {
                        boundary.push(line(l, crs, feature_index)?);
                    }
                }
                GeometryJson::Other => {
                    tracing::warn!(
                        feature = feature_index,
                        "skipping unsupported coastline feature"
                    );
                    continue;
                }
            }
            feature_count += 1;
        }

        if !land.is_empty() {
            let merged = land.into_iter().fold(MultiPolygon::new(Vec::new()), |acc, p| {
                acc.union(&MultiPolygon::new(vec![p]))
            });
            for p in merged {
                let (exterior, interiors) = p.into_inner();
                boundary.push(exterior);
                boundary.extend(interiors);
            }
        }

        boundary.retain(|l| l.0.len() >= 2);
        if boundary.is_empty() {
            return Err(ReferenceLoadError::Empty("coastline".into()));
        }

        Ok(Self {
            boundary,
            feature_count,
        })
    }
}

// GeoJSON, only as much of it as the layers use.

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    crs: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<GeometryJson>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryJson {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    #[serde(other)]
    Other,
}

/// Coordinate system a file's positions are in.
#[derive(Debug, Clone, Copy)]
enum SourceCrs {
    Geographic,
    Projected(Utm),
}

impl FeatureCollection {
    fn parse(text: &str) -> Result<Self, ReferenceLoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// RFC 7946 files are always WGS84; older files may name a CRS.
    fn crs(&self) -> Result<SourceCrs, ReferenceLoadError> {
        let Some(name) = self
            .crs
            .as_ref()
            .and_then(|c| c.pointer("/properties/name"))
            .and_then(Value::as_str)
        else {
            return Ok(SourceCrs::Geographic);
        };

        if name.ends_with("CRS84") {
            return Ok(SourceCrs::Geographic);
        }

        let code = name
            .rsplit(':')
            .next()
            .and_then(|c| c.trim().parse::<u32>().ok());

        match code {
            Some(4326) => Ok(SourceCrs::Geographic),
            Some(code) => Utm::from_epsg(code)
                .map(SourceCrs::Projected)
                .ok_or_else(|| ReferenceLoadError::UnsupportedCrs(name.to_string())),
            None => Err(ReferenceLoadError::UnsupportedCrs(name.to_string())),
        }
    }
}

impl Feature {
    fn property_text(&self, key: &str) -> Option<String> {
        match self.properties.as_ref()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn coord(
    position: &Position,
    crs: SourceCrs,
    feature: usize,
) -> Result<Coord<f64>, ReferenceLoadError> {
    let (x, y) = match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => (*x, *y),
        _ => {
            return Err(ReferenceLoadError::Geometry {
                feature,
                reason: format!("bad position {position:?}"),
            })
        }
    };

    Ok(match crs {
        SourceCrs::Geographic => Coord { x, y },
        SourceCrs::Projected(utm) => utm.inverse(Coord { x, y }),
    })
}

fn line(
    positions: &[Position],
    crs: SourceCrs,
    feature: usize,
) -> Result<LineString<f64>, ReferenceLoadError> {
    positions
        .iter()
        .map(|p| coord(p, crs, feature))
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn polygon(
    rings: &[Vec<Position>],
    crs: SourceCrs,
    feature: usize,
) -> Result<Polygon<f64>, ReferenceLoadError> {
    let mut rings = rings.iter().map(|r| line(r, crs, feature));
    let exterior = rings.next().ok_or_else(|| ReferenceLoadError::Geometry {
        feature,
        reason: "polygon without rings".into(),
    })??;

    if exterior.0.len() < 3 {
        return Err(ReferenceLoadError::Geometry {
            feature,
            reason: "exterior ring has fewer than 3 positions".into(),
        });
    }

    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

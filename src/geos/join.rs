// geos/join.rs
use crate::domain::{DropCounts, DropReason, NormalizedListing};
use crate::geos::{CoastlineLayer, Utm, ZonePolygon, ZoningLayer};
use geo::{Contains, Coord, EuclideanDistance, LineString, MapCoords, Point};

/// First polygon, in layer order, whose interior holds the point.
/// Points on an edge are outside.
pub fn locate(layer: &ZoningLayer, point: Point<f64>) -> Option<&ZonePolygon> {
    let (x, y) = point.x_y();
    layer.polygons.iter().find(|zone| {
        let (min, max) = (zone.bbox.min(), zone.bbox.max());
        x > min.x && x < max.x && y > min.y && y < max.y && zone.geometry.contains(&point)
    })
}

/// Pairs each listing with the label of the zone it sits in.
/// Listings outside every polygon are dropped. A polygon with no label still
/// counts as a match: its listings are kept with a `None` label and later
/// classify as `NOZONING` at the default density, rather than being filtered
/// out as unzoned.
pub fn join_zoning(
    listings: Vec<NormalizedListing>,
    layer: &ZoningLayer,
    drops: &mut DropCounts,
) -> Vec<(NormalizedListing, Option<String>)> {
    let mut out = Vec::with_capacity(listings.len());

    for listing in listings {
        let point = Point::new(listing.longitude, listing.latitude);
        match locate(layer, point) {
            Some(zone) => {
                let label = zone.zoning_label.clone();
                out.push((listing, label));
            }
            None => drops.record(DropReason::NoZone),
        }
    }

    out
}

/// Coastline boundary in UTM metres.
pub struct ProjectedCoastline {
    utm: Utm,
    boundary: Vec<LineString<f64>>,
}

impl ProjectedCoastline {
    pub fn new(layer: &CoastlineLayer, utm: Utm) -> Self {
        let boundary = layer
            .boundary
            .iter()
            .map(|line| line.map_coords(|c| utm.forward(c)))
            .collect();
        Self { utm, boundary }
    }

    /// Shortest distance in metres from a WGS84 position to the boundary.
    pub fn distance_m(&self, longitude: f64, latitude: f64) -> f64 {
        let p = Point::from(self.utm.forward(Coord {
            x: longitude,
            y: latitude,
        }));

        self.boundary
            .iter()
            .map(|line| p.euclidean_distance(line))
            .fold(f64::INFINITY, f64::min)
    }
}

pub fn join_coastal_distance(
    listings: Vec<NormalizedListing>,
    coast: &ProjectedCoastline,
) -> Vec<(NormalizedListing, f64)> {
    listings
        .into_iter()
        .map(|l| {
            let d = coast.distance_m(l.longitude, l.latitude);
            (l, d)
        })
        .collect()
}

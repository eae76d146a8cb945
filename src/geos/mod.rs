mod cache;
mod join;
mod layer;
mod layer_error;
mod projection;
mod reference;

pub use cache::{Clock, LayerCache, SystemClock};
pub use join::{join_coastal_distance, join_zoning, ProjectedCoastline};
pub use layer::{CoastlineLayer, LayerLocation, ZonePolygon, ZoningLayer};
pub use layer_error::ReferenceLoadError;
pub use projection::Utm;
pub use reference::{LayerSources, ReferenceLayers};

#[cfg(test)]
pub use cache::ManualClock;

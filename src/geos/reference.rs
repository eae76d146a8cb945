// geos/reference.rs
use crate::geos::{
    Clock, CoastlineLayer, LayerCache, LayerLocation, ReferenceLoadError, ZoningLayer,
};
use chrono::Duration;
use reqwest::blocking::Client;
use std::sync::Arc;

/// Where the two reference layers come from and which property holds the
/// zoning label.
#[derive(Debug, Clone)]
pub struct LayerSources {
    pub zoning: LayerLocation,
    pub zoning_label_property: String,
    pub coastline: LayerLocation,
}

/// Zoning and coastline layers behind a shared TTL cache.
/// Safe to share between concurrently running pipelines.
pub struct ReferenceLayers {
    sources: LayerSources,
    client: Client,
    zoning: LayerCache<ZoningLayer>,
    coastline: LayerCache<CoastlineLayer>,
}

impl ReferenceLayers {
    pub fn new(
        sources: LayerSources,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        client: Client,
    ) -> Self {
        Self {
            sources,
            client,
            zoning: LayerCache::new(ttl, Arc::clone(&clock)),
            coastline: LayerCache::new(ttl, clock),
        }
    }

    pub fn zoning(&self) -> Result<Arc<ZoningLayer>, ReferenceLoadError> {
        let location = &self.sources.zoning;
        let key = location.to_string();

        self.zoning
            .get_or_load(&key, || -> Result<ZoningLayer, ReferenceLoadError> {
                tracing::info!(source = %location, "loading zoning layer");
                let text = location.read_to_string(&self.client)?;
                let layer = ZoningLayer::from_geojson(&text, &self.sources.zoning_label_property)?;
                tracing::info!(polygons = layer.len(), "zoning layer loaded");
                Ok(layer)
            })
            .inspect_err(|e| {
                tracing::error!(source = %location, error = %e, "could not load zoning")
            })
    }

    pub fn coastline(&self) -> Result<Arc<CoastlineLayer>, ReferenceLoadError> {
        let location = &self.sources.coastline;
        let key = location.to_string();

        self.coastline
            .get_or_load(&key, || -> Result<CoastlineLayer, ReferenceLoadError> {
                tracing::info!(source = %location, "loading coastline layer");
                let text = location.read_to_string(&self.client)?;
                let layer = CoastlineLayer::from_geojson(&text)?;
                tracing::info!(features = layer.feature_count, "coastline layer loaded");
                Ok(layer)
            })
            .inspect_err(|e| {
                tracing::error!(source = %location, error = %e, "could not load coastline")
            })
    }
}

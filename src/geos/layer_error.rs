use thiserror::Error;

/// A zoning or coastline layer could not be produced.
/// The caller decides whether the run can proceed; nothing stale is substituted.
#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("could not read layer file: {0}")]
    Io(#[from] std::io::Error),

    #[error("layer download failed with HTTP {status}")]
    Http { status: u16 },

    #[error("layer download failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("layer is not valid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad geometry in feature {feature}: {reason}")]
    Geometry { feature: usize, reason: String },

    #[error("unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    #[error("layer {0} has no usable features")]
    Empty(String),
}

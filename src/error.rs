use crate::bounds::LatLngBounds;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layer or service url `{0}`")]
    InvalidUrl(String),

    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// ArcGIS reports failures inside a 200 response as `{"error": {...}}`.
    #[error("service error {code}: {message}")]
    Service { code: i64, message: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid GeoJSON: {0}")]
    GeoJson(String),

    #[error("no layers or tables found on this service: {0}")]
    NoLayers(String),

    #[error("layer {0} not found on this service")]
    LayerNotFound(i64),

    #[error("refusing to fit invalid bounds {0:?}")]
    InvalidBounds(LatLngBounds),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

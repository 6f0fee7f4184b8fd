//! Inspect ArcGIS Feature Services and Feature Layers: metadata, field
//! schema, sample records and a map preview of the layer's extent.
//!
//! The part with actual decision logic is [`resolver::resolve_bounds`]: it
//! turns a service-declared extent (WGS84 or Web Mercator) into geographic
//! bounds, or defers to a live query against the layer.

#[macro_use]
mod macros;

pub mod bounds;
pub mod client;
pub mod config_params;
pub mod error;
pub mod extent;
pub mod graticule;
pub mod inspect;
pub mod layer;
pub mod preview;
pub mod projection;
pub mod report;
pub mod resolver;
pub mod session;
pub mod viewport;

pub use bounds::{LatLng, LatLngBounds};
pub use error::{Error, Result};
pub use extent::{Crs, Extent, SpatialReference};
pub use resolver::resolve_bounds;

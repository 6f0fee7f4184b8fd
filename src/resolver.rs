//! Resolution of a layer's geographic bounds.
//!
//! The declared extent is tried first; when it is absent or in a coordinate
//! system that cannot be converted, the caller-supplied fallback (normally a
//! live query against the layer) decides. `ExtentResolver` generalizes this
//! into an ordered chain of strategies.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::bounds::LatLngBounds;
use crate::error::Result;
use crate::extent::Extent;
use crate::layer::Samples;

/// Resolves `extent` directly when it is WGS84 or Web Mercator, otherwise
/// awaits `fallback` exactly once and returns its answer unchanged.
///
/// Never fails: a fallback error is logged and becomes `None`. The result is
/// not validated; check `LatLngBounds::is_valid` before fitting a map to it.
pub async fn resolve_bounds<F, Fut>(extent: Option<&Extent>, fallback: F) -> Option<LatLngBounds>
    where F: FnOnce() -> Fut,
          Fut: Future<Output = Result<Option<LatLngBounds>>>
{
    if let Some(bounds) = extent.and_then(Extent::to_lat_lng_bounds) {
        return Some(bounds);
    }
    debug!(?extent, "declared extent unusable, querying live bounds");
    match fallback().await {
        Ok(bounds) => bounds,
        Err(e) => {
            warn!("live bounds query failed: {}", e);
            None
        }
    }
}

/// Outcome of one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attempt {
    Resolved(LatLngBounds),
    TryNext,
}

impl From<Option<LatLngBounds>> for Attempt {
    fn from(bounds: Option<LatLngBounds>) -> Self {
        match bounds {
            Some(b) => Attempt::Resolved(b),
            None => Attempt::TryNext,
        }
    }
}

/// The layer a resolution is performed for.
#[derive(Debug, Clone, Copy)]
pub struct LayerTarget<'a> {
    pub url: &'a str,
    pub token: Option<&'a str>,
}

#[async_trait]
pub trait BoundsStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, target: &LayerTarget<'_>) -> Result<Attempt>;
}

/// Asks the service for the actual bounding box of a layer's features.
#[async_trait]
pub trait LiveBoundsQuery: Send + Sync {
    async fn query_bounds(&self, layer_url: &str, token: Option<&str>)
                          -> Result<Option<LatLngBounds>>;
}

/// The extent published in the layer metadata.
pub struct DeclaredExtent(pub Option<Extent>);

#[async_trait]
impl BoundsStrategy for DeclaredExtent {
    fn name(&self) -> &'static str {
        "declared extent"
    }

    async fn attempt(&self, _target: &LayerTarget<'_>) -> Result<Attempt> {
        Ok(self.0.as_ref().and_then(Extent::to_lat_lng_bounds).into())
    }
}

pub struct LiveExtentQuery<'q>(pub &'q dyn LiveBoundsQuery);

#[async_trait]
impl<'q> BoundsStrategy for LiveExtentQuery<'q> {
    fn name(&self) -> &'static str {
        "live extent query"
    }

    async fn attempt(&self, target: &LayerTarget<'_>) -> Result<Attempt> {
        Ok(self.0.query_bounds(target.url, target.token).await?.into())
    }
}

/// Bounds computed over the geometry of already fetched sample features.
pub struct SampleGeometry<'s>(pub &'s Samples);

#[async_trait]
impl<'s> BoundsStrategy for SampleGeometry<'s> {
    fn name(&self) -> &'static str {
        "sample geometry"
    }

    async fn attempt(&self, _target: &LayerTarget<'_>) -> Result<Attempt> {
        Ok(self.0.bounds().into())
    }
}

/// Ordered chain of strategies; the first one with valid bounds wins.
#[derive(Default)]
pub struct ExtentResolver<'a> {
    strategies: Vec<Box<dyn BoundsStrategy + 'a>>,
}

impl<'a> ExtentResolver<'a> {
    pub fn new() -> Self {
        ExtentResolver { strategies: Vec::new() }
    }

    pub fn with<S>(mut self, strategy: S) -> Self
        where S: BoundsStrategy + 'a
    {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Runs the strategies in order. Errors are logged and skipped.
    ///
    /// The first valid box wins. An invalid one (say a zero-sized extent) is
    /// kept aside and returned as-is only when no later strategy does better.
    pub async fn resolve(&self, target: &LayerTarget<'_>) -> Option<LatLngBounds> {
        let mut degenerate = None;
        for strategy in &self.strategies {
            match strategy.attempt(target).await {
                Ok(Attempt::Resolved(bounds)) if bounds.is_valid() => {
                    debug!(layer = target.url, strategy = strategy.name(), ?bounds, "bounds resolved");
                    return Some(bounds);
                }
                Ok(Attempt::Resolved(bounds)) => {
                    debug!(layer = target.url, strategy = strategy.name(), ?bounds, "invalid bounds, trying next");
                    degenerate = degenerate.or(Some(bounds));
                }
                Ok(Attempt::TryNext) => {
                    debug!(layer = target.url, strategy = strategy.name(), "no bounds, trying next");
                }
                Err(e) => {
                    warn!(layer = target.url, strategy = strategy.name(), "bounds strategy failed: {}", e);
                }
            }
        }
        degenerate
    }
}

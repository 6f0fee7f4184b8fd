//! End-to-end inspection of a service or layer URL.

use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use crate::bounds::LatLngBounds;
use crate::client::{is_service_url, ArcGisClient};
use crate::config_params::Config;
use crate::error::{Error, Result};
use crate::graticule::prepare_geojson_graticule;
use crate::layer::{LayerInfo, Samples};
use crate::preview::{Preview, Style};
use crate::report::Report;
use crate::resolver::{DeclaredExtent, ExtentResolver, LayerTarget, LiveExtentQuery, SampleGeometry};
use crate::session::InspectionSession;
use crate::viewport::{fit_or_default, Viewport};

#[derive(Debug, Clone)]
pub struct Inspection {
    pub layer_url: String,
    pub info: LayerInfo,
    pub count: Option<u64>,
    pub samples: Samples,
    pub bounds: Option<LatLngBounds>,
}

impl Inspection {
    pub fn report(&self) -> Report<'_> {
        Report {
            layer_url: &self.layer_url,
            info: &self.info,
            count: self.count,
            samples: &self.samples,
            bounds: self.bounds.as_ref(),
        }
    }
}

fn lock(session: &Mutex<InspectionSession>) -> MutexGuard<'_, InspectionSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Inspector<'c> {
    client: &'c ArcGisClient,
    sample_size: u32,
}

impl<'c> Inspector<'c> {
    pub fn new(client: &'c ArcGisClient, sample_size: u32) -> Self {
        Inspector {
            client,
            sample_size,
        }
    }

    /// Turns the user's URL into a layer URL. Service URLs select `layer_id`
    /// or, without one, the first layer or table.
    pub async fn pick_layer(&self,
                            session: &Mutex<InspectionSession>,
                            url: &str,
                            layer_id: Option<i64>)
                            -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidUrl(String::new()));
        }
        if !is_service_url(url) {
            if layer_id.is_some() {
                warn!(url, "layer id ignored for a layer url");
            }
            return Ok(url.to_string());
        }
        let token = {
            let mut s = lock(session);
            s.set_service_url(url);
            s.token().map(str::to_string)
        };
        let service = self.client.service_info(url, token.as_deref()).await?;
        if service.layers.is_empty() {
            return Err(Error::NoLayers(url.to_string()));
        }
        let layer = match layer_id {
            Some(id) => service.find(id).ok_or(Error::LayerNotFound(id))?,
            None => &service.layers[0],
        };
        info!(layer = layer.url.as_str(), name = layer.name.as_str(), "selected layer");
        Ok(layer.url.clone())
    }

    /// Inspects one layer. Returns `Ok(None)` when another inspection started
    /// on the session in the meantime; the result is then discarded.
    pub async fn inspect_layer(&self,
                               session: &Mutex<InspectionSession>,
                               layer_url: &str)
                               -> Result<Option<Inspection>> {
        let (ticket, token) = {
            let mut s = lock(session);
            (s.begin(layer_url), s.token().map(str::to_string))
        };
        let token = token.as_deref();
        info!(layer = layer_url, "inspecting layer");

        let info = self.client.layer_info(layer_url, token).await?;
        let count = match self.client.feature_count(layer_url, token).await {
            Ok(count) => count,
            Err(e) => {
                warn!(layer = layer_url, "feature count unavailable: {}", e);
                None
            }
        };
        let samples = match self.client
                  .sample_features(layer_url, token, self.sample_size)
                  .await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(layer = layer_url, "sample query failed: {}", e);
                Samples::default()
            }
        };

        let target = LayerTarget {
            url: layer_url,
            token,
        };
        let bounds = {
            let resolver = ExtentResolver::new()
                .with(DeclaredExtent(info.declared_extent()))
                .with(LiveExtentQuery(self.client))
                .with(SampleGeometry(&samples));
            resolver.resolve(&target).await
        };

        if !lock(session).apply_bounds(&ticket, bounds) {
            info!(layer = layer_url, "inspection superseded, result discarded");
            return Ok(None);
        }
        Ok(Some(Inspection {
                    layer_url: layer_url.to_string(),
                    info,
                    count,
                    samples,
                    bounds,
                }))
    }

    pub async fn inspect(&self,
                         session: &Mutex<InspectionSession>,
                         url: &str,
                         layer_id: Option<i64>)
                         -> Result<Option<Inspection>> {
        let layer_url = self.pick_layer(session, url, layer_id).await?;
        self.inspect_layer(session, &layer_url).await
    }
}

/// The preview viewport: fitted to the resolved bounds, or the default view.
pub fn preview_viewport(config: &Config, inspection: &Inspection) -> Viewport {
    let mut viewport = Viewport::new(config.map.width, config.map.height);
    fit_or_default(&mut viewport,
                   inspection.bounds.as_ref(),
                   config.map.padding,
                   config.map.default_view.as_view());
    viewport
}

pub fn write_preview(config: &Config, inspection: &Inspection, output: &str) -> Result<Viewport> {
    let viewport = preview_viewport(config, inspection);
    let graticule = prepare_geojson_graticule(config.map.graticule_step);
    let style = Style {
        background: config.map.background.clone(),
        ..Style::default()
    };
    Preview {
            viewport: &viewport,
            graticule: Some(&graticule),
            bounds: inspection.bounds.as_ref(),
            samples: inspection.samples.geometry.as_ref(),
        }
        .save(output, &style)?;
    Ok(viewport)
}

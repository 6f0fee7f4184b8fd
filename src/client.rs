//! Minimal client for the ArcGIS REST API endpoints the inspector needs.

use std::time::Duration;

use async_trait::async_trait;
use geojson::GeoJson;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use url::Url;

use crate::bounds::LatLngBounds;
use crate::error::{Error, Result};
use crate::extent::Extent;
use crate::layer::{LayerInfo, Samples, ServiceInfo};
use crate::resolver::LiveBoundsQuery;

/// Whether `url` names a whole service rather than one of its layers.
pub fn is_service_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map_or(false, |last| last == "FeatureServer" || last == "MapServer")
        }
        Err(_) => false,
    }
}

#[derive(Debug, Clone)]
pub struct ArcGisClient {
    http: reqwest::Client,
}

impl ArcGisClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("featurescope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| {
                         Error::Http {
                             url: String::new(),
                             source,
                         }
                     })?;
        Ok(ArcGisClient { http })
    }

    fn endpoint(&self,
                base: &str,
                suffix: Option<&str>,
                params: &[(&str, &str)],
                token: Option<&str>)
                -> Result<Url> {
        let mut raw = base.trim_end_matches('/').to_string();
        if let Some(suffix) = suffix {
            raw.push('/');
            raw.push_str(suffix);
        }
        let mut url = Url::parse(&raw).map_err(|_| Error::InvalidUrl(base.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for &(key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(token) = token.filter(|t| !t.is_empty()) {
                pairs.append_pair("token", token);
            }
        }
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        // Never log the query string: it may carry the token.
        debug!(endpoint = %url.path(), "GET");
        let wrap = |source| {
            Error::Http {
                url: url.path().to_string(),
                source,
            }
        };
        let response = self.http
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(wrap)?;
        response.text().await.map_err(wrap)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.get_text(url).await?;
        let value: JsonValue = serde_json::from_str(&body)?;
        check_service_error(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn layer_info(&self, layer_url: &str, token: Option<&str>) -> Result<LayerInfo> {
        let url = self.endpoint(layer_url, None, &[("f", "json")], token)?;
        self.get_json(url).await
    }

    pub async fn service_info(&self, service_url: &str, token: Option<&str>) -> Result<ServiceInfo> {
        let url = self.endpoint(service_url, None, &[("f", "json")], token)?;
        let value: JsonValue = self.get_json(url).await?;
        let service = ServiceInfo::from_json(service_url, &value);
        info!(service = service_url, layers = service.layers.len(), "listed service");
        Ok(service)
    }

    pub async fn feature_count(&self, layer_url: &str, token: Option<&str>) -> Result<Option<u64>> {
        let url = self.endpoint(layer_url,
                           Some("query"),
                           &[("where", "1=1"), ("returnCountOnly", "true"), ("f", "json")],
                           token)?;
        let value: JsonValue = self.get_json(url).await?;
        Ok(value.get("count").and_then(|c| c.as_u64()))
    }

    /// Up to `limit` features with all attributes and WGS84 geometry.
    pub async fn sample_features(&self,
                                 layer_url: &str,
                                 token: Option<&str>,
                                 limit: u32)
                                 -> Result<Samples> {
        let limit = limit.to_string();
        let url = self.endpoint(layer_url,
                           Some("query"),
                           &[("where", "1=1"),
                             ("outFields", "*"),
                             ("returnGeometry", "true"),
                             ("outSR", "4326"),
                             ("resultRecordCount", &limit),
                             ("f", "geojson")],
                           token)?;
        let body = self.get_text(url).await?;
        let value: JsonValue = serde_json::from_str(&body)?;
        check_service_error(&value)?;
        let geojson = body.parse::<GeoJson>().map_err(|e| Error::GeoJson(e.to_string()))?;
        Ok(Samples::from_geojson(geojson))
    }
}

#[async_trait]
impl LiveBoundsQuery for ArcGisClient {
    async fn query_bounds(&self, layer_url: &str, token: Option<&str>)
                          -> Result<Option<LatLngBounds>> {
        let url = self.endpoint(layer_url,
                           Some("query"),
                           &[("where", "1=1"),
                             ("returnExtentOnly", "true"),
                             ("outSR", "4326"),
                             ("f", "json")],
                           token)?;
        let value: JsonValue = self.get_json(url).await?;
        Ok(value
               .get("extent")
               .and_then(Extent::from_json)
               .and_then(|extent| extent.to_lat_lng_bounds()))
    }
}

fn check_service_error(value: &JsonValue) -> Result<()> {
    match value.get("error") {
        Some(error) => {
            Err(Error::Service {
                    code: int_field!(error, "code").unwrap_or(0),
                    message: string_or_default!(error, "message", "unknown error"),
                })
        }
        None => Ok(()),
    }
}

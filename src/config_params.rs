use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::bounds::LatLng;
use crate::error::{Error, Result};
use crate::graticule::MIN_STEP;
use crate::viewport::{WORLD_CENTER, WORLD_ZOOM};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultView {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for DefaultView {
    fn default() -> Self {
        DefaultView {
            center: [WORLD_CENTER.lat, WORLD_CENTER.lng],
            zoom: WORLD_ZOOM,
        }
    }
}

impl DefaultView {
    pub fn as_view(&self) -> (LatLng, f64) {
        (LatLng::new(self.center[0], self.center[1]), self.zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapParams {
    pub width: u32,
    pub height: u32,
    pub padding: f64,
    pub background: String,
    pub output: String,
    pub graticule_step: f64,
    pub default_view: DefaultView,
}

impl Default for MapParams {
    fn default() -> Self {
        MapParams {
            width: 800,
            height: 500,
            padding: 20.0,
            background: String::from("#f2efe9"),
            output: String::from("preview.svg"),
            graticule_step: 10.0,
            default_view: DefaultView::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryParams {
    pub sample_size: u32,
    pub timeout_secs: u64,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            sample_size: 100,
            timeout_secs: 30,
        }
    }
}

impl QueryParams {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map: MapParams,
    pub query: QueryParams,
}

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Config::from_toml(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(Error::Config("map width and height must be positive".to_string()));
        }
        if !self.map.padding.is_finite() || self.map.padding < 0.0 {
            return Err(Error::Config("map padding must be a non-negative number".to_string()));
        }
        if !(self.map.graticule_step.is_finite() && self.map.graticule_step >= MIN_STEP) {
            return Err(Error::Config(format!("map graticule_step must be at least {} degree",
                                             MIN_STEP)));
        }
        if self.query.sample_size == 0 {
            return Err(Error::Config("query sample_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

//! Service-declared extents and their conversion to geographic bounds.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::bounds::{LatLng, LatLngBounds};
use crate::projection::web_mercator_to_lat_lng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct SpatialReference {
    #[serde(default)]
    pub wkid: Option<i64>,
    #[serde(default, rename = "latestWkid")]
    pub latest_wkid: Option<i64>,
}

impl SpatialReference {
    pub fn from_wkid(wkid: i64) -> Self {
        SpatialReference {
            wkid: Some(wkid),
            latest_wkid: None,
        }
    }

    /// The effective code: `latestWkid` wins over the legacy `wkid`.
    pub fn code(&self) -> Option<i64> {
        self.latest_wkid.or(self.wkid)
    }

    pub fn crs(&self) -> Option<Crs> {
        self.code().map(Crs::from_code)
    }
}

/// The coordinate systems a preview can be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    Wgs84,
    WebMercator,
    Other(i64),
}

impl Crs {
    pub fn from_code(code: i64) -> Self {
        match code {
            4326 => Crs::Wgs84,
            // Same spherical Mercator under its historical Esri identifiers.
            3857 | 102100 | 102113 => Crs::WebMercator,
            other => Crs::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub spatial_reference: Option<SpatialReference>,
}

impl Extent {
    pub fn new(xmin: f64,
               ymin: f64,
               xmax: f64,
               ymax: f64,
               spatial_reference: Option<SpatialReference>)
               -> Self {
        Extent {
            xmin,
            ymin,
            xmax,
            ymax,
            spatial_reference,
        }
    }

    /// Reads an ArcGIS extent object. Returns `None` unless all four
    /// coordinates are present and finite.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let spatial_reference = value
            .get("spatialReference")
            .and_then(|sr| SpatialReference::deserialize(sr).ok());
        Some(Extent {
                 xmin: finite_field!(value, "xmin")?,
                 ymin: finite_field!(value, "ymin")?,
                 xmax: finite_field!(value, "xmax")?,
                 ymax: finite_field!(value, "ymax")?,
                 spatial_reference,
             })
    }

    fn is_finite(&self) -> bool {
        self.xmin.is_finite() && self.ymin.is_finite() && self.xmax.is_finite() &&
        self.ymax.is_finite()
    }

    /// Geographic bounds for a WGS84 or Web Mercator extent; `None` for
    /// anything else, including non-finite coordinates.
    ///
    /// The result may be degenerate; see `LatLngBounds::is_valid`.
    pub fn to_lat_lng_bounds(&self) -> Option<LatLngBounds> {
        if !self.is_finite() {
            return None;
        }
        match self.spatial_reference.as_ref().and_then(SpatialReference::crs)? {
            Crs::Wgs84 => {
                Some(LatLngBounds::from_corners(LatLng::new(self.ymin, self.xmin),
                                                LatLng::new(self.ymax, self.xmax)))
            }
            Crs::WebMercator => {
                let sw = web_mercator_to_lat_lng(self.xmin, self.ymin);
                let ne = web_mercator_to_lat_lng(self.xmax, self.ymax);
                Some(LatLngBounds::from_corners(sw, ne))
            }
            Crs::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_arcgis_extent() {
        let value = json!({
            "xmin": -10.0, "ymin": -5.0, "xmax": 10.0, "ymax": 5,
            "spatialReference": {"wkid": 102100, "latestWkid": 3857}
        });
        let extent = Extent::from_json(&value).unwrap();
        assert_eq!(extent.ymax, 5.0);
        let sr = extent.spatial_reference.unwrap();
        assert_eq!(sr.code(), Some(3857));
        assert_eq!(sr.crs(), Some(Crs::WebMercator));
    }

    #[test]
    fn partial_extent_is_absent() {
        assert!(Extent::from_json(&json!({"xmin": 1.0, "ymin": 2.0, "xmax": 3.0})).is_none());
        assert!(Extent::from_json(&json!({"xmin": "NaN", "ymin": 2.0, "xmax": 3.0, "ymax": 4.0}))
                    .is_none());
        assert!(Extent::from_json(&json!(null)).is_none());
        assert!(Extent::from_json(&json!([1, 2, 3, 4])).is_none());
    }

    #[test]
    fn missing_spatial_reference_is_unresolved() {
        let extent = Extent::from_json(&json!({"xmin": 0, "ymin": 0, "xmax": 1, "ymax": 1}))
            .unwrap();
        assert!(extent.spatial_reference.is_none());
        assert!(extent.to_lat_lng_bounds().is_none());
    }

    #[test]
    fn malformed_spatial_reference_is_ignored() {
        let extent = Extent::from_json(&json!({
            "xmin": 0, "ymin": 0, "xmax": 1, "ymax": 1,
            "spatialReference": {"wkid": "4326"}
        }))
                .unwrap();
        assert!(extent.to_lat_lng_bounds().is_none());
    }

    #[test]
    fn crs_codes() {
        assert_eq!(Crs::from_code(4326), Crs::Wgs84);
        assert_eq!(Crs::from_code(102113), Crs::WebMercator);
        assert_eq!(Crs::from_code(2154), Crs::Other(2154));
    }
}

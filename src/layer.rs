use chrono::{DateTime, Utc};
use geojson::{Feature, GeoJson, Geometry, Value};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::bounds::{LatLng, LatLngBounds};
use crate::extent::Extent;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditingInfo {
    #[serde(default, rename = "lastEditDate")]
    pub last_edit_date: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
}

/// Layer (or table) metadata as returned by `<layer url>?f=json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub layer_type: Option<String>,
    #[serde(default)]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub service_item_id: Option<String>,
    #[serde(default)]
    pub editing_info: Option<EditingInfo>,
    #[serde(default)]
    pub last_edit_date: Option<i64>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub extent: Option<JsonValue>,
    #[serde(default)]
    pub full_extent: Option<JsonValue>,
}

impl LayerInfo {
    /// `extent`, or `fullExtent` when the former is missing or unusable.
    pub fn declared_extent(&self) -> Option<Extent> {
        self.extent
            .as_ref()
            .and_then(Extent::from_json)
            .or_else(|| self.full_extent.as_ref().and_then(Extent::from_json))
    }

    pub fn display_type(&self) -> Option<&str> {
        self.geometry_type.as_deref().or(self.layer_type.as_deref())
    }

    pub fn display_owner(&self) -> Option<&str> {
        self.owner.as_deref().or(self.service_item_id.as_deref())
    }

    pub fn last_edit(&self) -> Option<DateTime<Utc>> {
        self.editing_info
            .as_ref()
            .and_then(|info| info.last_edit_date)
            .or(self.last_edit_date)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerRef {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// The layers and tables published by a Feature/Map service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceInfo {
    pub layers: Vec<LayerRef>,
}

impl ServiceInfo {
    pub fn from_json(service_url: &str, value: &JsonValue) -> Self {
        let base = service_url.trim_end_matches('/');
        let mut layers = Vec::new();
        for key in &["layers", "tables"] {
            let entries = match value.get(*key).and_then(|v| v.as_array()) {
                Some(entries) => entries,
                None => continue,
            };
            for entry in entries {
                if let Some(id) = int_field!(entry, "id") {
                    layers.push(LayerRef {
                                    id,
                                    name: string_or_default!(entry, "name", format!("Layer {}", id)),
                                    url: format!("{}/{}", base, id),
                                });
                }
            }
        }
        ServiceInfo { layers }
    }

    pub fn find(&self, id: i64) -> Option<&LayerRef> {
        self.layers.iter().find(|l| l.id == id)
    }
}

/// Sample records, attributes in the column order the service returned.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, JsonValue>>,
    pub geometry: Option<GeoJson>,
}

impl Samples {
    pub fn from_geojson(geojson: GeoJson) -> Self {
        let rows: Vec<Map<String, JsonValue>> = features(&geojson)
            .iter()
            .map(|f| f.properties.clone().unwrap_or_default())
            .collect();
        let columns = rows.first()
            .map(|attrs| attrs.keys().cloned().collect())
            .unwrap_or_default();
        Samples {
            columns,
            rows,
            geometry: Some(geojson),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bounds of every coordinate in the sample geometry.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geometry.as_ref().and_then(geometry_bounds)
    }
}

pub fn features(geojson: &GeoJson) -> Vec<&Feature> {
    match *geojson {
        GeoJson::FeatureCollection(ref collection) => collection.features.iter().collect(),
        GeoJson::Feature(ref feature) => vec![feature],
        GeoJson::Geometry(_) => Vec::new(),
    }
}

/// Geographic bounds of GeoJSON (WGS84, `[lng, lat]` positions).
pub fn geometry_bounds(geojson: &GeoJson) -> Option<LatLngBounds> {
    fn push(points: &mut Vec<LatLng>, position: &[f64]) {
        if position.len() >= 2 {
            points.push(LatLng::new(position[1], position[0]));
        }
    }
    fn visit(geom: &Geometry, points: &mut Vec<LatLng>) {
        match geom.value {
            Value::Point(ref point) => push(points, point),
            Value::MultiPoint(ref positions) |
            Value::LineString(ref positions) => {
                for position in positions {
                    push(points, position);
                }
            }
            Value::MultiLineString(ref rings) |
            Value::Polygon(ref rings) => {
                for position in rings.iter().flatten() {
                    push(points, position);
                }
            }
            Value::MultiPolygon(ref polygons) => {
                for position in polygons.iter().flatten().flatten() {
                    push(points, position);
                }
            }
            Value::GeometryCollection(ref geometries) => {
                for g in geometries {
                    visit(g, points);
                }
            }
        }
    }
    let mut points = Vec::new();
    match *geojson {
        GeoJson::Geometry(ref geom) => visit(geom, &mut points),
        _ => {
            for feature in features(geojson) {
                if let Some(ref geom) = feature.geometry {
                    visit(geom, &mut points);
                }
            }
        }
    }
    LatLngBounds::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: JsonValue) -> GeoJson {
        value.to_string().parse::<GeoJson>().unwrap()
    }

    #[test]
    fn bounds_from_mixed_geometry() {
        let geojson = parse(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"a": 1},
                 "geometry": {"type": "Point", "coordinates": [2.0, 48.0]}},
                {"type": "Feature", "properties": {"a": 2},
                 "geometry": {"type": "Polygon", "coordinates": [[[-1.0, 40.0], [3.0, 40.0], [3.0, 50.0], [-1.0, 40.0]]]}},
                {"type": "Feature", "properties": {"a": 3}, "geometry": null}
            ]
        }));
        let bounds = geometry_bounds(&geojson).unwrap();
        assert_eq!(bounds, LatLngBounds::new(40.0, -1.0, 50.0, 3.0));
    }

    #[test]
    fn no_geometry_no_bounds() {
        let geojson = parse(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "properties": {"a": 1}, "geometry": null}]
        }));
        assert!(geometry_bounds(&geojson).is_none());
    }

    #[test]
    fn samples_keep_column_order() {
        let geojson = parse(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "properties": {"zeta": 1, "alpha": "x"},
                          "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}}]
        }));
        let samples = Samples::from_geojson(geojson);
        assert_eq!(samples.columns, vec!["zeta".to_string(), "alpha".to_string()]);
        assert_eq!(samples.rows.len(), 1);
    }

    #[test]
    fn service_lists_layers_then_tables() {
        let value = json!({
            "layers": [{"id": 0, "name": "Parcels"}, {"id": 3}],
            "tables": [{"id": 7, "name": "Owners"}]
        });
        let service = ServiceInfo::from_json("https://host/arcgis/rest/services/X/FeatureServer/",
                                             &value);
        let urls: Vec<&str> = service.layers.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls,
                   vec!["https://host/arcgis/rest/services/X/FeatureServer/0",
                        "https://host/arcgis/rest/services/X/FeatureServer/3",
                        "https://host/arcgis/rest/services/X/FeatureServer/7"]);
        assert_eq!(service.find(3).unwrap().name, "Layer 3");
        assert!(service.find(4).is_none());
    }

    #[test]
    fn layer_info_prefers_editing_info_and_extent() {
        let info: LayerInfo = serde_json::from_value(json!({
            "name": "Parcels",
            "type": "Feature Layer",
            "geometryType": "esriGeometryPolygon",
            "serviceItemId": "abc",
            "lastEditDate": 0,
            "editingInfo": {"lastEditDate": 1700000000000i64},
            "fields": [{"name": "OBJECTID", "alias": "Object ID", "type": "esriFieldTypeOID"}],
            "extent": {"xmin": "NaN"},
            "fullExtent": {"xmin": 1, "ymin": 2, "xmax": 3, "ymax": 4,
                           "spatialReference": {"wkid": 4326}}
        }))
                .unwrap();
        assert_eq!(info.display_type(), Some("esriGeometryPolygon"));
        assert_eq!(info.display_owner(), Some("abc"));
        assert_eq!(info.last_edit().unwrap().timestamp(), 1700000000);
        assert_eq!(info.declared_extent().unwrap().xmax, 3.0);
        assert_eq!(info.fields[0].field_type.as_deref(), Some("esriFieldTypeOID"));
    }
}

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use featurescope::client::ArcGisClient;
use featurescope::resolver::LiveBoundsQuery;
use featurescope::{Error, LatLngBounds};

const LAYER: &str = "/arcgis/rest/services/Parcels/FeatureServer/0";

fn client() -> ArcGisClient {
    ArcGisClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn layer_info_passes_token_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LAYER))
        .and(query_param("f", "json"))
        .and(query_param("token", "s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Parcels",
            "type": "Feature Layer",
            "geometryType": "esriGeometryPolygon",
            "fields": [{"name": "OBJECTID", "type": "esriFieldTypeOID"}],
            "extent": {"xmin": -10, "ymin": -5, "xmax": 10, "ymax": 5,
                       "spatialReference": {"wkid": 4326}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), LAYER);
    let info = client().layer_info(&url, Some("s3cr3t")).await.unwrap();
    assert_eq!(info.name.as_deref(), Some("Parcels"));
    assert_eq!(info.fields.len(), 1);
    let extent = info.declared_extent().unwrap();
    assert_eq!(extent.to_lat_lng_bounds(),
               Some(LatLngBounds::new(-5.0, -10.0, 5.0, 10.0)));
}

#[tokio::test]
async fn extent_query_asks_for_wgs84() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/query", LAYER)))
        .and(query_param("where", "1=1"))
        .and(query_param("returnExtentOnly", "true"))
        .and(query_param("outSR", "4326"))
        .and(query_param("f", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extent": {"xmin": 2.25, "ymin": 48.8, "xmax": 2.42, "ymax": 48.9,
                       "spatialReference": {"wkid": 4326, "latestWkid": 4326}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), LAYER);
    let bounds = client().query_bounds(&url, None).await.unwrap();
    assert_eq!(bounds, Some(LatLngBounds::new(48.8, 2.25, 48.9, 2.42)));
}

#[tokio::test]
async fn empty_layer_has_no_live_extent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/query", LAYER)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extent": {"xmin": "NaN", "ymin": "NaN", "xmax": "NaN", "ymax": "NaN",
                       "spatialReference": {"wkid": 4326}}
        })))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), LAYER);
    assert_eq!(client().query_bounds(&url, None).await.unwrap(), None);
}

#[tokio::test]
async fn count_and_samples() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/query", LAYER)))
        .and(query_param("returnCountOnly", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/query", LAYER)))
        .and(query_param("f", "geojson"))
        .and(query_param("outFields", "*"))
        .and(query_param("resultRecordCount", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"OBJECTID": 1, "NAME": "a"},
                 "geometry": {"type": "Point", "coordinates": [10.0, 50.0]}},
                {"type": "Feature", "properties": {"OBJECTID": 2, "NAME": "b"},
                 "geometry": {"type": "Point", "coordinates": [12.0, 52.0]}}
            ]
        })))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), LAYER);
    let client = client();
    assert_eq!(client.feature_count(&url, None).await.unwrap(), Some(42));
    let samples = client.sample_features(&url, None, 2).await.unwrap();
    assert_eq!(samples.rows.len(), 2);
    assert_eq!(samples.columns, vec!["OBJECTID".to_string(), "NAME".to_string()]);
    assert_eq!(samples.bounds(), Some(LatLngBounds::new(50.0, 10.0, 52.0, 12.0)));
}

#[tokio::test]
async fn service_error_bodies_become_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LAYER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": 498, "message": "Invalid token.", "details": []}
        })))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), LAYER);
    match client().layer_info(&url, Some("expired")).await {
        Err(Error::Service { code, message }) => {
            assert_eq!(code, 498);
            assert_eq!(message, "Invalid token.");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn http_failures_become_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), LAYER);
    let err = client().query_bounds(&url, Some("s3cr3t")).await.unwrap_err();
    match err {
        Error::Http { ref url, .. } => assert!(!url.contains("s3cr3t")),
        ref other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn service_listing_includes_tables() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/arcgis/rest/services/Parcels/FeatureServer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "layers": [{"id": 0, "name": "Parcels"}],
            "tables": [{"id": 3, "name": "Owners"}]
        })))
        .mount(&server)
        .await;

    let url = format!("{}/arcgis/rest/services/Parcels/FeatureServer/", server.uri());
    let service = client().service_info(&url, None).await.unwrap();
    assert_eq!(service.layers.len(), 2);
    assert_eq!(service.find(3).unwrap().name, "Owners");
    assert!(service.find(3).unwrap().url.ends_with("/FeatureServer/3"));
    assert!(service.find(1).is_none());
}

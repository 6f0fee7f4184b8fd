use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

use crate::projection::MAX_LATITUDE;

/// Finest grid spacing, in degrees, that is accepted.
pub const MIN_STEP: f64 = 1.0;

fn steps(start: f64, end_inclusive: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
        let v = start + step * i as f64;
        if v > end_inclusive + 1e-9 {
            break;
        }
        values.push(v);
        i += 1;
    }
    values
}

/// Meridians and parallels every `step` degrees, as one MultiLineString in
/// `[lng, lat]` order. Parallels stop at the Mercator latitude limit.
/// Steps finer than `MIN_STEP` (or not finite) fall back to 10 degrees.
pub fn prepare_geojson_graticule(step: f64) -> GeoJson {
    let step = if step.is_finite() && step >= MIN_STEP { step } else { 10.0 };
    // Vertices every degree so parallels and meridians stay smooth once projected.
    let lats = steps(-MAX_LATITUDE, MAX_LATITUDE, 1.0);
    let lngs = steps(-180.0, 180.0, 1.0);

    let mut coordinates = Vec::new();
    for x in steps(-180.0, 180.0, step) {
        coordinates.push(lats.iter().map(|&y| vec![x, y]).collect::<Vec<_>>());
    }
    for y in steps(0.0, MAX_LATITUDE, step) {
        coordinates.push(lngs.iter().map(|&x| vec![x, y]).collect::<Vec<_>>());
        if y > 0.0 {
            coordinates.push(lngs.iter().map(|&x| vec![x, -y]).collect::<Vec<_>>());
        }
    }
    let features = vec![Feature {
                            geometry: Some(Geometry::new(Value::MultiLineString(coordinates))),
                            properties: None,
                            bbox: None,
                            id: None,
                            foreign_members: None,
                        }];
    GeoJson::FeatureCollection(FeatureCollection {
                                   bbox: None,
                                   features,
                                   foreign_members: None,
                               })
}

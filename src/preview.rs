use std::path::Path;

use geojson::{GeoJson, Geometry, Value};
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Path as SvgPath, Rectangle as Rect};
use svg::{Document, Node};
use tracing::info;

use crate::bounds::{LatLng, LatLngBounds};
use crate::error::Result;
use crate::layer::features;
use crate::viewport::Viewport;

pub struct Style {
    pub background: String,
    pub graticule: String,
    pub extent: String,
    pub fill: String,
    pub stroke: String,
    pub radius: f64,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            background: String::from("#f2efe9"),
            graticule: String::from("#c8c8c8"),
            extent: String::from("#007aff"),
            fill: String::from("#ff0033"),
            stroke: String::from("#990000"),
            radius: 4.0,
        }
    }
}

/// Draws GeoJSON (WGS84) into the pixel space of a viewport.
pub struct Converter<'a> {
    viewport: &'a Viewport,
}

impl<'a> Converter<'a> {
    pub fn new(viewport: &'a Viewport) -> Self {
        Converter { viewport }
    }

    fn pixel(&self, position: &[f64]) -> Option<(f64, f64)> {
        if position.len() < 2 {
            return None;
        }
        let p = LatLng::new(position[1], position[0]);
        if p.is_finite() {
            Some(self.viewport.project(&p))
        } else {
            None
        }
    }

    pub fn graticule(&self, geojson: &GeoJson, style: &Style) -> Group {
        let mut group = Group::new().set("id", "graticule");
        for feature in features(geojson) {
            if let Some(ref geom) = feature.geometry {
                self.draw_geometry(&mut group, geom, "none", &style.graticule, 0.5, style.radius);
            }
        }
        group
    }

    pub fn samples(&self, geojson: &GeoJson, style: &Style) -> Group {
        let mut group = Group::new().set("id", "samples");
        for feature in features(geojson) {
            if let Some(ref geom) = feature.geometry {
                self.draw_geometry(&mut group, geom, &style.fill, &style.stroke, 1.0, style.radius);
            }
        }
        group
    }

    pub fn extent(&self, bounds: &LatLngBounds, style: &Style) -> Rect {
        let (x0, y1) = self.viewport.project(&bounds.south_west());
        let (x1, y0) = self.viewport.project(&bounds.north_east());
        Rect::new()
            .set("id", "extent")
            .set("x", x0)
            .set("y", y0)
            .set("width", (x1 - x0).max(0.0))
            .set("height", (y1 - y0).max(0.0))
            .set("fill", style.extent.clone())
            .set("fill-opacity", 0.1)
            .set("stroke", style.extent.clone())
            .set("stroke-width", 2.0)
    }

    fn draw_geometry(&self,
                     group: &mut Group,
                     geom: &Geometry,
                     fill: &str,
                     stroke: &str,
                     stroke_width: f64,
                     radius: f64) {
        match geom.value {
            Value::Point(ref point) => {
                if let Some(circle) = self.draw_point(point, fill, stroke, radius) {
                    group.append(circle);
                }
            }
            Value::MultiPoint(ref points) => {
                for point in points {
                    if let Some(circle) = self.draw_point(point, fill, stroke, radius) {
                        group.append(circle);
                    }
                }
            }
            Value::LineString(ref positions) => {
                let data = self.draw_path(&[positions.to_vec()], Data::new(), false);
                group.append(path(data, "none", stroke, stroke_width));
            }
            Value::MultiLineString(ref lines) => {
                let data = self.draw_path(lines, Data::new(), false);
                group.append(path(data, "none", stroke, stroke_width));
            }
            Value::Polygon(ref rings) => {
                let data = self.draw_path(rings, Data::new(), true);
                group.append(path(data, fill, stroke, stroke_width));
            }
            Value::MultiPolygon(ref polygons) => {
                let mut data = Data::new();
                for rings in polygons {
                    data = self.draw_path(rings, data, true);
                }
                group.append(path(data, fill, stroke, stroke_width));
            }
            Value::GeometryCollection(ref geometries) => {
                for g in geometries {
                    self.draw_geometry(group, g, fill, stroke, stroke_width, radius);
                }
            }
        }
    }

    fn draw_point(&self, point: &[f64], fill: &str, stroke: &str, radius: f64) -> Option<Circle> {
        let (cx, cy) = self.pixel(point)?;
        Some(Circle::new()
                 .set("cx", cx)
                 .set("cy", cy)
                 .set("r", radius)
                 .set("fill", fill)
                 .set("fill-opacity", 0.7)
                 .set("stroke", stroke))
    }

    fn draw_path(&self, rings: &[Vec<Vec<f64>>], mut data: Data, close: bool) -> Data {
        for ring in rings {
            let mut pixels = ring.iter().filter_map(|p| self.pixel(p));
            let first = match pixels.next() {
                Some(first) => first,
                None => continue,
            };
            data = data.move_to((first.0 as f32, first.1 as f32));
            for (x, y) in pixels {
                data = data.line_to((x as f32, y as f32));
            }
            if close {
                data = data.close();
            }
        }
        data
    }
}

fn path(data: Data, fill: &str, stroke: &str, stroke_width: f64) -> SvgPath {
    SvgPath::new()
        .set("fill", fill)
        .set("fill-opacity", if fill == "none" { 1.0 } else { 0.4 })
        .set("stroke", stroke)
        .set("stroke-width", stroke_width)
        .set("d", data)
}

/// The layers of a preview; everything but the viewport is optional.
pub struct Preview<'a> {
    pub viewport: &'a Viewport,
    pub graticule: Option<&'a GeoJson>,
    pub bounds: Option<&'a LatLngBounds>,
    pub samples: Option<&'a GeoJson>,
}

impl<'a> Preview<'a> {
    pub fn render(&self, style: &Style) -> Document {
        let converter = Converter::new(self.viewport);
        let mut document = Document::new()
            .set("x", "0")
            .set("y", "0")
            .set("width", self.viewport.width())
            .set("height", self.viewport.height())
            .set("viewBox", (0.0, 0.0, self.viewport.width(), self.viewport.height()));

        document = document.add(Rect::new()
                                    .set("fill", style.background.clone())
                                    .set("width", "100%")
                                    .set("height", "100%"));
        if let Some(graticule) = self.graticule {
            document = document.add(converter.graticule(graticule, style));
        }
        if let Some(bounds) = self.bounds.filter(|b| b.is_valid()) {
            document = document.add(converter.extent(bounds, style));
        }
        if let Some(samples) = self.samples {
            document = document.add(converter.samples(samples, style));
        }
        document
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, style: &Style) -> Result<()> {
        let document = self.render(style);
        svg::save(path.as_ref(), &document)?;
        info!(path = %path.as_ref().display(), "wrote preview");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graticule::prepare_geojson_graticule;
    use crate::viewport::MapView;

    #[test]
    fn renders_extent_and_samples() {
        let mut viewport = Viewport::new(400, 300);
        let bounds = LatLngBounds::new(-5.0, -10.0, 5.0, 10.0);
        viewport.fit_bounds(&bounds, 20.0).unwrap();
        let samples: GeoJson = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0.0,0.0]}},
            {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[-5.0,-2.0],[5.0,2.0]]}}
        ]}"#
                .parse()
                .unwrap();
        let graticule = prepare_geojson_graticule(10.0);
        let svg = Preview {
                viewport: &viewport,
                graticule: Some(&graticule),
                bounds: Some(&bounds),
                samples: Some(&samples),
            }
            .render(&Style::default())
            .to_string();
        assert!(svg.contains("id=\"graticule\""));
        assert!(svg.contains("id=\"extent\""));
        assert!(svg.contains("id=\"samples\""));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("cx=\"200\""));
    }

    #[test]
    fn invalid_bounds_are_not_drawn() {
        let viewport = Viewport::new(400, 300);
        let degenerate = LatLngBounds::new(0.0, 0.0, 0.0, 0.0);
        let svg = Preview {
                viewport: &viewport,
                graticule: None,
                bounds: Some(&degenerate),
                samples: None,
            }
            .render(&Style::default())
            .to_string();
        assert!(!svg.contains("id=\"extent\""));
    }
}

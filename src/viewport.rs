use tracing::{debug, info};

use crate::bounds::{LatLng, LatLngBounds};
use crate::error::{Error, Result};
use crate::projection::{lat_lng_to_web_mercator, web_mercator_to_lat_lng, HALF_WORLD};

pub const TILE_SIZE: f64 = 256.0;

/// Whole-world view used when nothing better is known.
pub const WORLD_CENTER: LatLng = LatLng { lat: 20.0, lng: 0.0 };
pub const WORLD_ZOOM: f64 = 2.0;

/// Something that displays a region of the map.
pub trait MapView {
    /// Moves the view so `bounds` is fully visible with `padding` pixels on
    /// every side. Invalid bounds are rejected and leave the view unchanged.
    fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: f64) -> Result<()>;

    fn set_view(&mut self, center: LatLng, zoom: f64);
}

/// Fits `bounds` when usable, otherwise shows `default`. Never fails.
pub fn fit_or_default<V: MapView>(view: &mut V,
                                  bounds: Option<&LatLngBounds>,
                                  padding: f64,
                                  default: (LatLng, f64)) {
    if let Some(b) = bounds {
        match view.fit_bounds(b, padding) {
            Ok(()) => return,
            Err(e) => debug!("{}, using default view", e),
        }
    }
    view.set_view(default.0, default.1);
}

/// A spherical Mercator viewport on 256 px tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    center: LatLng,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Viewport {
            width: width as f64,
            height: height as f64,
            center: WORLD_CENTER,
            zoom: WORLD_ZOOM,
            min_zoom: 0.0,
            max_zoom: 19.0,
        }
    }

    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2f64.powf(zoom)
    }

    fn world_pixel(&self, lat_lng: &LatLng) -> (f64, f64) {
        let (x, y) = lat_lng_to_web_mercator(lat_lng);
        let size = Viewport::world_size(self.zoom);
        ((x + HALF_WORLD) / (2.0 * HALF_WORLD) * size, (HALF_WORLD - y) / (2.0 * HALF_WORLD) * size)
    }

    /// Pixel position of `lat_lng` relative to the top-left corner.
    pub fn project(&self, lat_lng: &LatLng) -> (f64, f64) {
        let (px, py) = self.world_pixel(lat_lng);
        let (cx, cy) = self.world_pixel(&self.center);
        (px - cx + self.width / 2.0, py - cy + self.height / 2.0)
    }

    /// Geographic bounds currently visible.
    pub fn visible_bounds(&self) -> LatLngBounds {
        let (cx, cy) = lat_lng_to_web_mercator(&self.center);
        let meters_per_px = 2.0 * HALF_WORLD / Viewport::world_size(self.zoom);
        let half_w = self.width / 2.0 * meters_per_px;
        let half_h = self.height / 2.0 * meters_per_px;
        LatLngBounds::from_corners(web_mercator_to_lat_lng(cx - half_w, cy - half_h),
                                   web_mercator_to_lat_lng(cx + half_w, cy + half_h))
    }
}

impl MapView for Viewport {
    fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: f64) -> Result<()> {
        if !bounds.is_valid() {
            return Err(Error::InvalidBounds(*bounds));
        }
        let available_w = (self.width - 2.0 * padding).max(1.0);
        let available_h = (self.height - 2.0 * padding).max(1.0);
        let (x0, y0) = lat_lng_to_web_mercator(&bounds.south_west());
        let (x1, y1) = lat_lng_to_web_mercator(&bounds.north_east());

        let mut zoom = self.min_zoom;
        let mut z = self.min_zoom.ceil();
        while z <= self.max_zoom {
            let px_per_meter = Viewport::world_size(z) / (2.0 * HALF_WORLD);
            if (x1 - x0) * px_per_meter <= available_w && (y1 - y0) * px_per_meter <= available_h {
                zoom = z;
                z += 1.0;
            } else {
                break;
            }
        }
        self.center = web_mercator_to_lat_lng((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        self.zoom = zoom;
        info!(center = ?self.center, zoom, "fitted view to bounds");
        Ok(())
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom.max(self.min_zoom).min(self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_bounds() {
        let mut view = Viewport::new(800, 500);
        let before = view.clone();
        let degenerate = LatLngBounds::new(0.0, 0.0, 0.0, 0.0);
        assert!(view.fit_bounds(&degenerate, 20.0).is_err());
        let nan = LatLngBounds::new(f64::NAN, 0.0, 1.0, 1.0);
        assert!(view.fit_bounds(&nan, 20.0).is_err());
        assert_eq!(view, before);
    }

    #[test]
    fn whole_world_fits_at_low_zoom() {
        let mut view = Viewport::new(800, 500);
        view.fit_bounds(&LatLngBounds::new(-85.0, -180.0, 85.0, 180.0), 20.0).unwrap();
        assert_eq!(view.zoom(), 0.0);
        assert!(view.center().lat.abs() < 1e-6);
    }

    #[test]
    fn small_bounds_zoom_in_and_stay_visible() {
        let mut view = Viewport::new(800, 500);
        let bounds = LatLngBounds::new(48.80, 2.25, 48.90, 2.42);
        view.fit_bounds(&bounds, 20.0).unwrap();
        assert!(view.zoom() >= 10.0);
        let (x0, y0) = view.project(&bounds.south_west());
        let (x1, y1) = view.project(&bounds.north_east());
        for &(x, y) in &[(x0, y0), (x1, y1)] {
            assert!(x >= 20.0 - 1e-6 && x <= 780.0 + 1e-6);
            assert!(y >= 20.0 - 1e-6 && y <= 480.0 + 1e-6);
        }
        assert!(view.visible_bounds().south <= bounds.south);
    }

    #[test]
    fn default_view_when_nothing_resolves() {
        let mut view = Viewport::new(800, 500);
        view.set_view(LatLng::new(10.0, 10.0), 6.0);
        fit_or_default(&mut view, None, 20.0, (WORLD_CENTER, WORLD_ZOOM));
        assert_eq!(view.center(), WORLD_CENTER);
        assert_eq!(view.zoom(), WORLD_ZOOM);

        let degenerate = LatLngBounds::new(1.0, 1.0, 1.0, 1.0);
        view.set_view(LatLng::new(10.0, 10.0), 6.0);
        fit_or_default(&mut view, Some(&degenerate), 20.0, (WORLD_CENTER, WORLD_ZOOM));
        assert_eq!(view.center(), WORLD_CENTER);
    }
}

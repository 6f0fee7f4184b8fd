#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Geographic bounding box in degrees.
///
/// Values are not validated on construction: a resolver may legitimately
/// produce a degenerate box (the projection of a zero-sized extent). Anything
/// that positions a map must check `is_valid` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        LatLngBounds {
            south,
            west,
            north,
            east,
        }
    }

    /// The box spanning two corners, whatever their order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        LatLngBounds {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    /// Smallest box containing every finite point, or `None` when there is none.
    pub fn from_points<I>(points: I) -> Option<Self>
        where I: IntoIterator<Item = LatLng>
    {
        let mut bounds: Option<LatLngBounds> = None;
        for point in points.into_iter().filter(LatLng::is_finite) {
            match bounds {
                Some(ref mut b) => b.extend(point),
                None => bounds = Some(LatLngBounds::from_corners(point, point)),
            }
        }
        bounds
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south = self.south.min(point.lat);
        self.west = self.west.min(point.lng);
        self.north = self.north.max(point.lat);
        self.east = self.east.max(point.lng);
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new((self.south + self.north) / 2.0,
                    (self.west + self.east) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.south.is_finite() && self.west.is_finite() && self.north.is_finite() &&
        self.east.is_finite()
    }

    /// Usable for fitting a map: finite with positive height and width.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.south < self.north && self.west < self.east
    }
}

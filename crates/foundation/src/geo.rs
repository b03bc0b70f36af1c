/// Geographic position in degrees (WGS84 lon/lat).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Axis-aligned lon/lat bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl GeoBounds {
    pub fn new(min: LonLat, max: LonLat) -> Self {
        Self { min, max }
    }

    /// An empty bounds that any `expand` call will overwrite.
    pub fn empty() -> Self {
        Self {
            min: LonLat::new(f64::INFINITY, f64::INFINITY),
            max: LonLat::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.lon_deg > self.max.lon_deg || self.min.lat_deg > self.max.lat_deg
    }

    pub fn expand(&mut self, p: LonLat) {
        self.min.lon_deg = self.min.lon_deg.min(p.lon_deg);
        self.min.lat_deg = self.min.lat_deg.min(p.lat_deg);
        self.max.lon_deg = self.max.lon_deg.max(p.lon_deg);
        self.max.lat_deg = self.max.lat_deg.max(p.lat_deg);
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LonLat>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.expand(*p);
        }
        b
    }

    pub fn contains(&self, p: LonLat) -> bool {
        !self.is_empty()
            && p.lon_deg >= self.min.lon_deg
            && p.lon_deg <= self.max.lon_deg
            && p.lat_deg >= self.min.lat_deg
            && p.lat_deg <= self.max.lat_deg
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            (self.min.lon_deg + self.max.lon_deg) * 0.5,
            (self.min.lat_deg + self.max.lat_deg) * 0.5,
        )
    }
}

/// Even-odd ray-cast test against a single ring.
///
/// The ring may be open or closed (a duplicated closing vertex is harmless).
/// Points exactly on an edge are not guaranteed a stable in/out answer; the
/// picking layer treats boundary clicks as belonging to whichever feature
/// tests positive first in its deterministic ordering.
pub fn point_in_ring(p: LonLat, ring: &[LonLat]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (px, py) = (p.lon_deg, p.lat_deg);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lon_deg, ring[i].lat_deg);
        let (xj, yj) = (ring[j].lon_deg, ring[j].lat_deg);
        let crosses = (yi > py) != (yj > py);
        if crosses {
            let x_at = (xj - xi) * (py - yi) / (yj - yi) + xi;
            if px < x_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Point-in-polygon for an exterior ring plus zero or more holes.
pub fn point_in_polygon(p: LonLat, rings: &[Vec<LonLat>]) -> bool {
    let Some(exterior) = rings.first() else {
        return false;
    };
    if !point_in_ring(p, exterior) {
        return false;
    }
    for hole in &rings[1..] {
        if point_in_ring(p, hole) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, LonLat, point_in_polygon, point_in_ring};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<LonLat> {
        vec![
            LonLat::new(x0, y0),
            LonLat::new(x1, y0),
            LonLat::new(x1, y1),
            LonLat::new(x0, y1),
        ]
    }

    #[test]
    fn ring_test_inside_and_outside() {
        let ring = square(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_ring(LonLat::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(LonLat::new(15.0, 5.0), &ring));
        assert!(!point_in_ring(LonLat::new(-1.0, -1.0), &ring));
    }

    #[test]
    fn ring_test_handles_closed_rings() {
        let mut ring = square(0.0, 0.0, 10.0, 10.0);
        ring.push(ring[0]);
        assert!(point_in_ring(LonLat::new(5.0, 5.0), &ring));
    }

    #[test]
    fn polygon_holes_exclude_points() {
        let rings = vec![square(0.0, 0.0, 10.0, 10.0), square(4.0, 4.0, 6.0, 6.0)];
        assert!(point_in_polygon(LonLat::new(2.0, 2.0), &rings));
        assert!(!point_in_polygon(LonLat::new(5.0, 5.0), &rings));
    }

    #[test]
    fn bounds_expand_and_contain() {
        let pts = square(70.0, 8.0, 90.0, 30.0);
        let b = GeoBounds::from_points(&pts);
        assert!(b.contains(LonLat::new(80.0, 22.0)));
        assert!(!b.contains(LonLat::new(60.0, 22.0)));
        assert_eq!(b.center(), LonLat::new(80.0, 19.0));
    }

    #[test]
    fn empty_bounds_contain_nothing() {
        let b = GeoBounds::empty();
        assert!(b.is_empty());
        assert!(!b.contains(LonLat::new(0.0, 0.0)));
    }
}

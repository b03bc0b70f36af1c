use foundation::LonLat;

/// Default camera center (roughly the middle of the subcontinent).
pub const DEFAULT_CENTER: LonLat = LonLat {
    lon_deg: 80.0,
    lat_deg: 22.0,
};

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 12.0;

/// Multiplicative step for the explicit zoom controls.
pub const ZOOM_STEP: f64 = 1.6;

/// Camera transform over the render surface: center plus zoom factor.
///
/// Drill clicks only ever *raise* zoom towards a level-specific floor
/// (`ensure_min_zoom`); a full reset is an explicit, separate operation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    pub center: LonLat,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: MIN_ZOOM,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Raises zoom to at least `floor`; never decreases it.
    pub fn ensure_min_zoom(&mut self, floor: f64) {
        self.zoom = self.zoom.max(floor).min(MAX_ZOOM);
    }

    pub fn set_center(&mut self, center: LonLat) {
        self.center = center;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

use foundation::Zone;
use foundation::precision::stable_total_cmp_f64;

/// One clickable pin on the degraded-mode panel.
///
/// Positions are fractions of the panel, not a projection; the panel is a
/// decorative stand-in, not a map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZonePin {
    pub zone: Zone,
    pub x_frac: f64,
    pub y_frac: f64,
}

/// The fixed five-zone picker shown when state boundaries are unavailable.
///
/// Keeps the surrounding page usable: a zone click still feeds the selection
/// even though no polygon-backed identifier can be produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePanel {
    pins: [ZonePin; 5],
}

impl Default for ZonePanel {
    fn default() -> Self {
        Self {
            pins: [
                ZonePin { zone: Zone::North, x_frac: 0.48, y_frac: 0.18 },
                ZonePin { zone: Zone::South, x_frac: 0.56, y_frac: 0.83 },
                ZonePin { zone: Zone::East, x_frac: 0.80, y_frac: 0.46 },
                ZonePin { zone: Zone::West, x_frac: 0.20, y_frac: 0.48 },
                ZonePin { zone: Zone::Central, x_frac: 0.53, y_frac: 0.46 },
            ],
        }
    }
}

impl ZonePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pins(&self) -> &[ZonePin] {
        &self.pins
    }

    /// Resolves a click at panel-relative coordinates to the nearest pin
    /// within `radius_frac`.
    ///
    /// Ordering contract: on an exact distance tie, the earlier pin in the
    /// fixed panel order wins.
    pub fn pin_near(&self, x_frac: f64, y_frac: f64, radius_frac: f64) -> Option<Zone> {
        let r2 = radius_frac * radius_frac;
        self.pins
            .iter()
            .map(|pin| {
                let dx = pin.x_frac - x_frac;
                let dy = pin.y_frac - y_frac;
                (pin.zone, dx * dx + dy * dy)
            })
            .filter(|(_, d2)| *d2 <= r2)
            .min_by(|(_, a), (_, b)| stable_total_cmp_f64(*a, *b))
            .map(|(zone, _)| zone)
    }
}

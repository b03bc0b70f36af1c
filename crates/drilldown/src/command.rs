use foundation::{GeoLevel, LonLat, RegionId, Zone};

/// Host-to-controller messages.
///
/// Replaces the setter-callback pairs of a two-way binding: the host sends
/// commands down, the controller owns every mutation, and state flows back
/// through accessors and the event log.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Root scope; set once at boot, rarely changed. Changing it clears the
    /// whole drill chain (the country is an ancestor of everything).
    SetCountry(RegionId),

    /// Required drill depth; controls which layers are requested at all.
    SetLevel(GeoLevel),

    /// Display-only zone highlight, independent of the identifier chain.
    SetZone(Option<Zone>),

    /// A click on the map surface; resolved against the layer stack.
    ClickAt(LonLat),

    /// A click on the degraded-mode panel, in panel-relative fractions.
    ClickFallbackAt { x_frac: f64, y_frac: f64 },

    /// Programmatic selection; clears descendants but leaves the camera
    /// alone (only real clicks nudge the zoom).
    SelectState(RegionId),
    SelectDistrict(RegionId),
    SelectMandal(RegionId),

    ZoomIn,
    ZoomOut,

    /// Clears the drill chain and restores the default camera. The country
    /// and the zone tag survive.
    Reset,
}

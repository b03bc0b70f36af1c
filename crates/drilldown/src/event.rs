use foundation::{GeoLevel, RegionId, Zone};
use streaming::ProviderError;

/// Controller decisions, frame-stamped on the event log.
///
/// This is the core's observability channel: hosts forward it to whatever
/// logging they run, tests assert against it directly.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillEvent {
    CountryChanged(RegionId),
    LevelChanged(GeoLevel),
    ZoneSelected(Option<Zone>),

    StateSelected(RegionId),
    DistrictSelected(RegionId),
    MandalSelected(RegionId),
    SelectionReset,

    LayerRequested {
        level: GeoLevel,
        parent: RegionId,
    },
    LayerLoaded {
        level: GeoLevel,
        parent: RegionId,
        features: usize,
        from_cache: bool,
    },
    LayerFailed {
        level: GeoLevel,
        parent: RegionId,
        error: ProviderError,
    },
    LayerTimedOut {
        level: GeoLevel,
        parent: RegionId,
    },
    LayerCleared(GeoLevel),
    StaleResponseDropped {
        level: GeoLevel,
        parent: RegionId,
    },

    /// The State layer failed; the five-zone panel takes over.
    FallbackActivated,

    CatalogLoaded {
        regions: usize,
    },
    CatalogUnavailable,
    CatalogResponseDropped,
}

use foundation::{GeoLevel, RegionId};

/// Ancestor key: which parent id a layer's fetch is scoped to.
///
/// The State layer is scoped by the country id; District by the selected
/// state; Mandal by the selected district.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerKey {
    pub level: GeoLevel,
    pub parent: RegionId,
}

impl LayerKey {
    pub fn new(level: GeoLevel, parent: RegionId) -> Self {
        Self { level, parent }
    }
}

impl std::fmt::Display for LayerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.level, self.parent)
    }
}

/// A single boundary fetch, tagged with the generation it was issued under.
///
/// A completion applies only when both the ancestor key and the generation
/// still match the owning slot; anything else is stale and must be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRequest {
    pub key: LayerKey,
    pub generation: u64,
}

impl LayerRequest {
    pub fn new(key: LayerKey, generation: u64) -> Self {
        Self { key, generation }
    }

    pub fn level(&self) -> GeoLevel {
        self.key.level
    }
}

/// Drill-down depth, ordered from coarsest to finest.
///
/// The ordering is load-bearing: "level X requires layer Y" checks are plain
/// comparisons, and ancestor/descendant relationships follow the same order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeoLevel {
    National,
    Zone,
    State,
    District,
    Mandal,
}

impl GeoLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoLevel::National => "national",
            GeoLevel::Zone => "zone",
            GeoLevel::State => "state",
            GeoLevel::District => "district",
            GeoLevel::Mandal => "mandal",
        }
    }

    pub fn order() -> [GeoLevel; 5] {
        [
            GeoLevel::National,
            GeoLevel::Zone,
            GeoLevel::State,
            GeoLevel::District,
            GeoLevel::Mandal,
        ]
    }

    /// Levels that are backed by boundary polygons (everything below Zone).
    pub fn boundary_levels() -> [GeoLevel; 3] {
        [GeoLevel::State, GeoLevel::District, GeoLevel::Mandal]
    }

    /// Whether a layer of boundary polygons exists for this level.
    pub fn has_boundaries(&self) -> bool {
        *self >= GeoLevel::State
    }

    /// The level whose selected id scopes this level's boundary fetch.
    ///
    /// Returns `None` for levels without boundaries; the State layer is
    /// scoped by the country id, which sits outside the drill chain.
    pub fn fetch_parent_level(&self) -> Option<GeoLevel> {
        match self {
            GeoLevel::District => Some(GeoLevel::State),
            GeoLevel::Mandal => Some(GeoLevel::District),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use foundation::{GeoLevel, RegionId, Zone};

/// The drill chain as a tagged union per level.
///
/// Illegal partial states (a district without its state) are
/// unrepresentable; changing an ancestor necessarily rebuilds the variant,
/// so descendants clear atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DrillChain {
    #[default]
    National,
    Stated {
        state: RegionId,
    },
    Districted {
        state: RegionId,
        district: RegionId,
    },
    Mandaled {
        state: RegionId,
        district: RegionId,
        mandal: RegionId,
    },
}

impl DrillChain {
    pub fn state(&self) -> Option<&RegionId> {
        match self {
            DrillChain::National => None,
            DrillChain::Stated { state }
            | DrillChain::Districted { state, .. }
            | DrillChain::Mandaled { state, .. } => Some(state),
        }
    }

    pub fn district(&self) -> Option<&RegionId> {
        match self {
            DrillChain::Districted { district, .. } | DrillChain::Mandaled { district, .. } => {
                Some(district)
            }
            _ => None,
        }
    }

    pub fn mandal(&self) -> Option<&RegionId> {
        match self {
            DrillChain::Mandaled { mandal, .. } => Some(mandal),
            _ => None,
        }
    }

    /// Deepest identifier level currently set.
    pub fn depth(&self) -> GeoLevel {
        match self {
            DrillChain::National => GeoLevel::National,
            DrillChain::Stated { .. } => GeoLevel::State,
            DrillChain::Districted { .. } => GeoLevel::District,
            DrillChain::Mandaled { .. } => GeoLevel::Mandal,
        }
    }
}

/// Current selection: the drill chain plus the orthogonal zone tag.
///
/// The zone tag is display-only highlighting state. It survives drilling and
/// reset, so it lives beside the chain rather than inside it; `level()`
/// still reports `Zone` when only a zone is set, preserving the five-level
/// observable behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    chain: DrillChain,
    zone: Option<Zone>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(&self) -> &DrillChain {
        &self.chain
    }

    pub fn zone(&self) -> Option<Zone> {
        self.zone
    }

    pub fn state(&self) -> Option<&RegionId> {
        self.chain.state()
    }

    pub fn district(&self) -> Option<&RegionId> {
        self.chain.district()
    }

    pub fn mandal(&self) -> Option<&RegionId> {
        self.chain.mandal()
    }

    /// Deepest level currently selected, counting a bare zone tag.
    pub fn level(&self) -> GeoLevel {
        let depth = self.chain.depth();
        if depth == GeoLevel::National && self.zone.is_some() {
            GeoLevel::Zone
        } else {
            depth
        }
    }

    /// Selects a state, clearing district and mandal.
    ///
    /// Re-selecting the current state still clears the descendants; that is
    /// the contract a repeated click relies on.
    pub fn select_state(&mut self, state: RegionId) {
        self.chain = DrillChain::Stated { state };
    }

    /// Selects a district under the current state, clearing the mandal.
    ///
    /// Returns `false` (a no-op, not an error) when no state is selected.
    pub fn select_district(&mut self, district: RegionId) -> bool {
        let Some(state) = self.chain.state().cloned() else {
            return false;
        };
        self.chain = DrillChain::Districted { state, district };
        true
    }

    /// Selects a mandal under the current district.
    ///
    /// Returns `false` (a no-op, not an error) when no district is selected.
    pub fn select_mandal(&mut self, mandal: RegionId) -> bool {
        let (state, district) = match &self.chain {
            DrillChain::Districted { state, district }
            | DrillChain::Mandaled {
                state, district, ..
            } => (state.clone(), district.clone()),
            _ => return false,
        };
        self.chain = DrillChain::Mandaled {
            state,
            district,
            mandal,
        };
        true
    }

    pub fn set_zone(&mut self, zone: Option<Zone>) {
        self.zone = zone;
    }

    /// Clears the drill chain; the zone tag is untouched.
    pub fn reset_chain(&mut self) {
        self.chain = DrillChain::National;
    }
}

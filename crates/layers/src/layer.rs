use foundation::{GeoLevel, RegionId};
use formats::{BoundaryCollection, BoundaryFeature};

/// A boundary feature with its resolved identifier.
///
/// Resolution runs once when a collection is bound into a layer, so clicks
/// and styling never re-run the name heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFeature {
    pub region: Option<RegionId>,
    pub feature: BoundaryFeature,
}

/// One level's boundary features, ready for drawing and picking.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayer {
    level: GeoLevel,
    features: Vec<BoundFeature>,
}

impl BoundaryLayer {
    /// Binds a decoded collection, resolving each feature's id via `resolve`.
    pub fn bind(
        level: GeoLevel,
        collection: &BoundaryCollection,
        mut resolve: impl FnMut(&BoundaryFeature) -> Option<RegionId>,
    ) -> Self {
        let features = collection
            .features
            .iter()
            .map(|feature| BoundFeature {
                region: resolve(feature),
                feature: feature.clone(),
            })
            .collect();
        Self { level, features }
    }

    pub fn level(&self) -> GeoLevel {
        self.level
    }

    pub fn features(&self) -> &[BoundFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// The loaded layers in their fixed stacking order.
///
/// The State layer is always the base; District draws above it and Mandal
/// above both. Layers are independent draw passes; binding a deeper layer
/// never replaces the ones underneath.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LayerStack {
    state: Option<BoundaryLayer>,
    district: Option<BoundaryLayer>,
    mandal: Option<BoundaryLayer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, layer: BoundaryLayer) {
        match layer.level() {
            GeoLevel::State => self.state = Some(layer),
            GeoLevel::District => self.district = Some(layer),
            GeoLevel::Mandal => self.mandal = Some(layer),
            // Levels without boundaries have no slot in the stack.
            _ => {}
        }
    }

    pub fn clear(&mut self, level: GeoLevel) {
        match level {
            GeoLevel::State => self.state = None,
            GeoLevel::District => self.district = None,
            GeoLevel::Mandal => self.mandal = None,
            _ => {}
        }
    }

    pub fn get(&self, level: GeoLevel) -> Option<&BoundaryLayer> {
        match level {
            GeoLevel::State => self.state.as_ref(),
            GeoLevel::District => self.district.as_ref(),
            GeoLevel::Mandal => self.mandal.as_ref(),
            _ => None,
        }
    }

    /// Layers bottom-to-top for rendering.
    pub fn draw_order(&self) -> impl Iterator<Item = &BoundaryLayer> {
        [self.state.as_ref(), self.district.as_ref(), self.mandal.as_ref()]
            .into_iter()
            .flatten()
    }

    /// Layers top-to-bottom for hit testing.
    pub fn pick_order(&self) -> impl Iterator<Item = &BoundaryLayer> {
        [self.mandal.as_ref(), self.district.as_ref(), self.state.as_ref()]
            .into_iter()
            .flatten()
    }
}

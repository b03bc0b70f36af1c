use foundation::{GeoLevel, LonLat, RegionId, point_in_polygon};

use crate::layer::LayerStack;

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub level: GeoLevel,
    pub feature_index: usize,
    pub region: Option<RegionId>,
}

/// Deterministic point picking over the layer stack.
///
/// Ordering contract:
/// - Layers are tested top-to-bottom (Mandal, District, State); the first
///   layer containing the point wins outright.
/// - Within a layer, the lowest feature index containing the point wins.
///
/// Feature bounds prefilter the exact polygon test; features whose bounds
/// miss the point are never tested precisely.
pub fn pick_point(stack: &LayerStack, point: LonLat) -> Option<PickHit> {
    for layer in stack.pick_order() {
        for (feature_index, bound) in layer.features().iter().enumerate() {
            if !bound.feature.bounds.contains(point) {
                continue;
            }
            let contained = bound
                .feature
                .polygons
                .iter()
                .any(|polygon| point_in_polygon(point, polygon));
            if contained {
                return Some(PickHit {
                    level: layer.level(),
                    feature_index,
                    region: bound.region.clone(),
                });
            }
        }
    }
    None
}

use foundation::GeoLevel;
use scene::Selection;

use crate::layer::BoundFeature;

/// Fill classes in priority order, highest first.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FillClass {
    /// The feature matches the active id for its level.
    Selected,
    /// The feature's zone tag matches the selected zone.
    ZoneMatch,
    Default,
}

/// Resolved draw style for one feature.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FeatureStyle {
    pub fill: [f32; 4],
    pub stroke: [f32; 4],
    pub stroke_width: f32,
    /// Drop-shadow accent behind selected/hovered features.
    pub shadowed: bool,
}

const FILL_DEFAULT: [f32; 4] = [0.886, 0.910, 0.941, 1.0];
const FILL_ACTIVE: [f32; 4] = [0.780, 0.824, 0.996, 1.0];
const FILL_ZONE: [f32; 4] = [0.859, 0.918, 0.996, 1.0];
const STROKE: [f32; 4] = [0.580, 0.639, 0.722, 1.0];

/// Classifies a feature against the current selection.
///
/// Priority: selected, then zone-match, then default. Selection comparison
/// uses the feature's bound id at its own level; zone comparison uses the
/// orthogonal zone tag.
pub fn classify(bound: &BoundFeature, level: GeoLevel, selection: &Selection) -> FillClass {
    let active = match level {
        GeoLevel::State => selection.state(),
        GeoLevel::District => selection.district(),
        GeoLevel::Mandal => selection.mandal(),
        _ => None,
    };
    if let (Some(active), Some(region)) = (active, bound.region.as_ref()) {
        if active == region {
            return FillClass::Selected;
        }
    }
    if let (Some(zone), Some(feature_zone)) = (selection.zone(), bound.feature.zone) {
        if zone == feature_zone {
            return FillClass::ZoneMatch;
        }
    }
    FillClass::Default
}

/// Resolves a class (plus the hover affordance) to a concrete style.
///
/// Hover always overrides the fill, regardless of class; it is purely
/// visual and mutates no state.
pub fn style_for(class: FillClass, hovered: bool) -> FeatureStyle {
    if hovered {
        return FeatureStyle {
            fill: FILL_ACTIVE,
            stroke: STROKE,
            stroke_width: 0.7,
            shadowed: true,
        };
    }
    match class {
        FillClass::Selected => FeatureStyle {
            fill: FILL_ACTIVE,
            stroke: STROKE,
            stroke_width: 0.5,
            shadowed: true,
        },
        FillClass::ZoneMatch => FeatureStyle {
            fill: FILL_ZONE,
            stroke: STROKE,
            stroke_width: 0.5,
            shadowed: false,
        },
        FillClass::Default => FeatureStyle {
            fill: FILL_DEFAULT,
            stroke: STROKE,
            stroke_width: 0.5,
            shadowed: false,
        },
    }
}

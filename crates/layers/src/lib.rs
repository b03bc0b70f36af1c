pub mod fallback;
pub mod layer;
pub mod mesh;
pub mod picking;
pub mod symbology;

pub use fallback::{ZonePanel, ZonePin};
pub use layer::{BoundFeature, BoundaryLayer, LayerStack};
pub use mesh::triangulate_feature;
pub use picking::{PickHit, pick_point};
pub use symbology::{FeatureStyle, FillClass, classify, style_for};

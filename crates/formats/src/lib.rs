pub mod geojson;

pub use geojson::{
    BoundaryCollection, BoundaryFeature, GeoJsonError, NAME_KEYS, sniff_display_name,
};

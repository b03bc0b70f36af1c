pub mod geo;
pub mod ids;
pub mod level;
pub mod precision;
pub mod zone;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use ids::*;
pub use level::*;
pub use zone::*;

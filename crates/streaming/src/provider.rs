use foundation::{GeoLevel, RegionId};
use serde_json::Value;

/// Failure modes of the geo data provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, TLS, broken body).
    Unreachable(String),
    /// The provider answered with a non-2xx status.
    Status(u16),
    /// The bounded wait elapsed before a response arrived.
    Timeout,
    /// The payload arrived but could not be decoded.
    Decode(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Unreachable(msg) => write!(f, "provider unreachable: {msg}"),
            ProviderError::Status(code) => write!(f, "provider returned status {code}"),
            ProviderError::Timeout => write!(f, "provider request timed out"),
            ProviderError::Decode(msg) => write!(f, "provider payload decode failed: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<formats::GeoJsonError> for ProviderError {
    fn from(e: formats::GeoJsonError) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

/// The external geo data provider, as seen by a host.
///
/// Implementations return raw JSON payloads; the controller decodes them
/// centrally so staleness checks and decode failures follow one path. The
/// controller itself never calls this trait: the host performs the fetches
/// its own way (blocking, async, cached) and feeds completions back.
pub trait GeoProvider {
    /// Country-level state boundaries as a GeoJSON FeatureCollection.
    fn fetch_state_layer(&self, country: &RegionId) -> Result<Value, ProviderError>;

    /// State-level district boundaries.
    fn fetch_district_layer(&self, state: &RegionId) -> Result<Value, ProviderError>;

    /// District-level mandal boundaries.
    fn fetch_mandal_layer(&self, district: &RegionId) -> Result<Value, ProviderError>;

    /// Canonical `{id, name, zone}` state listing used for name resolution.
    /// May legitimately be empty.
    fn list_canonical_states(&self, country: &RegionId) -> Result<Value, ProviderError>;

    /// Dispatch a boundary fetch by level.
    ///
    /// Panics on levels without boundary layers; callers route only
    /// State/District/Mandal requests here.
    fn fetch_layer(&self, level: GeoLevel, parent: &RegionId) -> Result<Value, ProviderError> {
        match level {
            GeoLevel::State => self.fetch_state_layer(parent),
            GeoLevel::District => self.fetch_district_layer(parent),
            GeoLevel::Mandal => self.fetch_mandal_layer(parent),
            other => unreachable!("no boundary layer at level {other}"),
        }
    }
}

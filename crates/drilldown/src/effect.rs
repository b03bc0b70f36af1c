use foundation::RegionId;
use serde_json::Value;
use streaming::{LayerRequest, ProviderError};

/// Work the host must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one boundary layer; answer with [`LayerResponse`].
    FetchLayer(LayerRequest),

    /// Fetch the canonical state listing; answer with
    /// [`CanonicalStatesResponse`].
    FetchCanonicalStates { country: RegionId, generation: u64 },
}

/// Completion of a [`Effect::FetchLayer`].
///
/// Carries the original request so the controller can drop completions whose
/// generation or ancestor key no longer matches.
#[derive(Debug, Clone)]
pub struct LayerResponse {
    pub request: LayerRequest,
    pub payload: Result<Value, ProviderError>,
}

/// Completion of a [`Effect::FetchCanonicalStates`].
#[derive(Debug, Clone)]
pub struct CanonicalStatesResponse {
    pub country: RegionId,
    pub generation: u64,
    pub payload: Result<Value, ProviderError>,
}

use foundation::{GeoLevel, RegionId};
use formats::BoundaryCollection;

use crate::request::{LayerKey, LayerRequest};

/// Per-level load lifecycle.
///
/// Replaces a single shared "loading" flag: callers can tell which layer is
/// pending, and a failure is a distinct terminal state rather than an empty
/// layer of unknown provenance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Owns one boundary layer's data and its load state.
///
/// Staleness contract:
/// - `begin` bumps the slot generation and records the ancestor key.
/// - `complete`/`fail` apply only when the request's generation AND ancestor
///   key both match the slot's current ones; otherwise they return `false`
///   and the slot is untouched. A response for ancestor A can therefore
///   never land after the selection moved to B, regardless of completion
///   order.
#[derive(Debug)]
pub struct LayerSlot {
    level: GeoLevel,
    phase: LayerPhase,
    parent: Option<RegionId>,
    generation: u64,
    begun_frame: u64,
    collection: Option<BoundaryCollection>,
}

impl LayerSlot {
    pub fn new(level: GeoLevel) -> Self {
        Self {
            level,
            phase: LayerPhase::Idle,
            parent: None,
            generation: 0,
            begun_frame: 0,
            collection: None,
        }
    }

    pub fn level(&self) -> GeoLevel {
        self.level
    }

    pub fn phase(&self) -> LayerPhase {
        self.phase
    }

    pub fn parent(&self) -> Option<&RegionId> {
        self.parent.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn collection(&self) -> Option<&BoundaryCollection> {
        self.collection.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LayerPhase::Loading
    }

    /// Whether this slot already holds (or is fetching) data for `parent`.
    pub fn covers(&self, parent: &RegionId) -> bool {
        self.parent.as_ref() == Some(parent)
            && matches!(self.phase, LayerPhase::Loading | LayerPhase::Loaded)
    }

    /// Starts a fetch for `parent`, superseding anything in flight.
    ///
    /// The previous collection is dropped immediately: once the ancestor
    /// changed, the old polygons are wrong to show.
    pub fn begin(&mut self, parent: RegionId, frame_index: u64) -> LayerRequest {
        self.generation += 1;
        self.phase = LayerPhase::Loading;
        self.parent = Some(parent.clone());
        self.begun_frame = frame_index;
        self.collection = None;
        LayerRequest::new(LayerKey::new(self.level, parent), self.generation)
    }

    /// Installs a cached collection without issuing a fetch.
    pub fn load_cached(&mut self, parent: RegionId, collection: BoundaryCollection) {
        self.generation += 1;
        self.phase = LayerPhase::Loaded;
        self.parent = Some(parent);
        self.collection = Some(collection);
    }

    /// Applies a successful completion. Returns `false` if stale.
    pub fn complete(&mut self, request: &LayerRequest, collection: BoundaryCollection) -> bool {
        if !self.accepts(request) {
            return false;
        }
        self.phase = LayerPhase::Loaded;
        self.collection = Some(collection);
        true
    }

    /// Applies a failed completion. Returns `false` if stale.
    ///
    /// The layer clears; the failure is remembered against the ancestor key
    /// so the controller does not refetch the same key in a loop.
    pub fn fail(&mut self, request: &LayerRequest) -> bool {
        if !self.accepts(request) {
            return false;
        }
        self.phase = LayerPhase::Failed;
        self.collection = None;
        true
    }

    /// Whether a load begun `timeout_frames` ago is overdue.
    pub fn timed_out(&self, now_frame: u64, timeout_frames: u64) -> bool {
        self.phase == LayerPhase::Loading
            && now_frame.saturating_sub(self.begun_frame) >= timeout_frames
    }

    /// Fails an overdue load in place, returning the request it supersedes.
    pub fn expire(&mut self) -> Option<LayerRequest> {
        if self.phase != LayerPhase::Loading {
            return None;
        }
        let parent = self.parent.clone()?;
        let request = LayerRequest::new(LayerKey::new(self.level, parent), self.generation);
        self.phase = LayerPhase::Failed;
        self.collection = None;
        Some(request)
    }

    /// Returns the slot to Idle with no data. The generation is not reset,
    /// so completions from before the clear stay stale forever.
    pub fn clear(&mut self) {
        self.phase = LayerPhase::Idle;
        self.parent = None;
        self.collection = None;
    }

    fn accepts(&self, request: &LayerRequest) -> bool {
        self.phase == LayerPhase::Loading
            && self.generation == request.generation
            && self.parent.as_ref() == Some(&request.key.parent)
    }
}

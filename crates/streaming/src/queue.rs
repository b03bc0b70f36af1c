use runtime::DispatchBudget;

use crate::request::LayerRequest;

/// Queue rejection: too many fetches already pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull {
    pub max_pending: usize,
}

impl std::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fetch queue full (max_pending={})", self.max_pending)
    }
}

impl std::error::Error for QueueFull {}

/// Pending boundary fetches with deterministic ordering and backpressure.
///
/// Ordering contract:
/// - Shallower levels dispatch first (the State layer unblocks everything
///   below it), then submission order within a level.
/// - `pop_next_with_budget` consumes one budget unit per dispatched request;
///   an exhausted budget leaves the queue untouched until the next frame.
#[derive(Debug)]
pub struct FetchQueue {
    pending: Vec<LayerRequest>,
    max_pending: usize,
}

impl FetchQueue {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Enqueues a request. Re-submitting an identical request is a no-op.
    pub fn try_submit(&mut self, request: LayerRequest) -> Result<(), QueueFull> {
        if self.pending.contains(&request) {
            return Ok(());
        }
        if self.pending.len() >= self.max_pending {
            return Err(QueueFull {
                max_pending: self.max_pending,
            });
        }
        self.pending.push(request);
        Ok(())
    }

    /// Drops every pending request matching `pred`; returns how many.
    pub fn cancel_where(&mut self, pred: impl Fn(&LayerRequest) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|r| !pred(r));
        before - self.pending.len()
    }

    pub fn pop_next_with_budget(&mut self, budget: &mut DispatchBudget) -> Option<LayerRequest> {
        if self.pending.is_empty() || !budget.try_consume(1) {
            return None;
        }
        let mut best = 0usize;
        for (idx, req) in self.pending.iter().enumerate() {
            if req.level() < self.pending[best].level() {
                best = idx;
            }
        }
        Some(self.pending.remove(best))
    }
}

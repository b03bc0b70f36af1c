use crate::frame::Frame;

/// A frame-stamped occurrence on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub payload: E,
}

/// Deterministic event log for traceability.
///
/// Consumers define their own payload enum; the bus only stamps and stores.
/// Events accumulate until drained, so a host can batch-read per frame.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, payload: E) {
        self.events.push(Event {
            frame_index: frame.index,
            payload,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}

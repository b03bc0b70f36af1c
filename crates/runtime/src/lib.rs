pub mod budget;
pub mod event_bus;
pub mod frame;

pub use budget::DispatchBudget;
pub use event_bus::{Event, EventBus};
pub use frame::Frame;

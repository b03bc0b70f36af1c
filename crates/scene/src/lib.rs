pub mod selection;
pub mod view;

pub use selection::{DrillChain, Selection};
pub use view::ViewState;

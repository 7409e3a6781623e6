//! Page-local UI state

pub mod input;
pub mod selection;

pub use input::InputState;
pub use selection::SelectionState;

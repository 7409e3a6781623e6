//! Ratatui terminal UI module
//!
//! Pages, navigation and the wizard frame.

pub mod app;
pub mod components;
pub mod event;
pub mod nav;
pub mod page;
pub mod pages;
pub mod state;
pub mod theme;

pub use app::{ExitReason, TuiApp, Wizard};
pub use event::{EventPoll, TuiEvent};
pub use nav::Navigator;
pub use page::{Command, Message, Page};
pub use state::{InputState, SelectionState};
pub use theme::{Theme, theme};

//! Terminal output.
//!
//! ```text
//! ┌─────────────┐
//! │  Commands   │  install, remove, update, ...
//! └──────┬──────┘
//!        │ Reporter calls (from many tasks)
//!        ▼
//! ┌─────────────┐
//! │   Output    │  cloneable sender
//! └──────┬──────┘
//!        │ UiEvent
//!        ▼
//! ┌─────────────┐
//! │    Actor    │  one thread, writes every line
//! └──────┬──────┘
//!        │ styles with
//!        ▼
//! ┌─────────────┐
//! │    Theme    │
//! └─────────────┘
//! ```

pub mod actor;
pub mod output;
pub mod theme;

pub use output::Output;
pub use theme::Theme;

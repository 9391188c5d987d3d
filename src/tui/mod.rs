//! TUI module for the interactive terminal session.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: actions, transitions, and the [`state::Model`] capability
//! - `prompt`, `session`: the two models (pure update + view)
//! - `view`: shared pure rendering
//! - `theme`: style roles
//! - `run`: effects (terminal lifecycle, key reader, event loop)

pub mod prompt;
pub mod run;
pub mod session;
pub mod state;
pub mod theme;
pub mod view;

pub use run::{Closing, SessionEnd, run};
pub use theme::Theme;

//! blobphish: interactive front end for multi-step threat analysis.

pub mod config;
pub mod error;
pub mod logging;
pub mod signal;
pub mod tui;
pub mod workflow;

//! Error types for the interactive session.

use std::convert::Infallible;
use std::io;

use thiserror::Error;

/// Failure while driving the terminal session.
///
/// Every variant is fatal: the caller reports it and exits non-zero.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Terminal setup, drawing or teardown failed.
    #[error("terminal I/O failed")]
    Io(#[from] io::Error),

    /// The key reader stopped before the session finished.
    #[error("terminal input stream closed")]
    InputClosed,
}

/// In-memory backends cannot fail to draw.
impl From<Infallible> for SessionError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

//! Top-level error type.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can stop the process: binding the listener, opening the
/// store, or bad configuration. Per-request failures never surface here;
/// they are mapped to responses at the handler boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(String),
}

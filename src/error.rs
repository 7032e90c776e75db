//! Error types for the cache crate
//!
//! Cache operations themselves are infallible; these errors cover
//! configuration and codec selection.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// An environment value could not be parsed or is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A codec name did not match any built-in codec
    #[error("Unknown value codec: {0}")]
    UnknownCodec(String),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;

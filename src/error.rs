//! Error types for the stackbar library.
//!
//! This module provides the [`Error`] enum and [`Result`] type alias used
//! throughout the library for error handling.

use thiserror::Error;

/// Error type for stackbar operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A bar was built with settings it cannot render with.
    ///
    /// Raised at construction time, e.g. for a `total` of zero, an empty fill
    /// glyph, or a rich-display backend without a display attached.
    #[error("invalid progress bar configuration: {0}")]
    InvalidConfiguration(String),

    /// An I/O error occurred (e.g., writing to a closed terminal).
    ///
    /// Writes are not retried.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for stackbar operations.
///
/// This is defined as `std::result::Result<T, stackbar::Error>` for convenience.
pub type Result<T> = std::result::Result<T, Error>;

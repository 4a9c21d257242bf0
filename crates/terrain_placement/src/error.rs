//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, unknown object types, height-source integrity failures,
//! IO, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown object type '{id}'")]
    UnknownObjectType { id: String },

    #[error("height source integrity error: {0}")]
    DataIntegrity(HeightFault),

    #[cfg(feature = "ron")]
    #[error("rule table parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A height sample that was non-finite or outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightFault {
    /// Map-space x coordinate of the offending sample.
    pub x: f32,
    /// Map-space y coordinate of the offending sample.
    pub y: f32,
    /// Value returned by the height source.
    pub value: f32,
}

impl std::fmt::Display for HeightFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "height_at({}, {}) returned {} (expected a finite value in [0, 1])",
            self.x, self.y, self.value
        )
    }
}

impl From<HeightFault> for Error {
    fn from(value: HeightFault) -> Self {
        Error::DataIntegrity(value)
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

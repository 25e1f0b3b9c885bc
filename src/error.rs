//! Error types for the ARM compute provider

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The provider catalog cannot support any resolution at all.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("imageId({id}) not found in: [{}]", searched.join(", "))]
    ImageNotFound { id: String, searched: Vec<String> },

    #[error("hardwareId({id}) not found in: [{}]", searched.join(", "))]
    HardwareNotFound { id: String, searched: Vec<String> },

    #[error("location id {id} not found in: [{}]", known.join(", "))]
    LocationNotFound { id: String, known: Vec<String> },

    /// No image/hardware combination satisfies the accumulated constraints.
    #[error("no match for {0}")]
    NoMatch(String),

    /// Transport-level failure surfaced by a catalog supplier.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed image urn: {0}")]
    MalformedUrn(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check whether this error means an id was simply absent from a catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ImageNotFound { .. }
                | Error::HardwareNotFound { .. }
                | Error::LocationNotFound { .. }
                | Error::NoMatch(..)
        )
    }
}

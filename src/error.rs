//! Error taxonomy for guide queries
//!
//! Only transport-level problems are errors. Structural absence in the
//! document and lookup misses are ordinary results, never `GuideError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuideError {
    /// Transport failure or non-success HTTP status from the provider.
    #[error("guide request failed: {0}")]
    Http(#[from] ureq::Error),

    /// The response body could not be read or decompressed.
    #[error("guide body unreadable: {0}")]
    Io(#[from] std::io::Error),
}

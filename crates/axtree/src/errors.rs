//! Error types for accessibility tree extraction

use std::time::Duration;
use thiserror::Error;

/// Error returned by a single attribute fetch on an [`crate::AttributeProvider`].
///
/// These never abort a subtree on their own: the tree builder substitutes the
/// documented default and keeps going. Only [`ProviderError::Unavailable`] or
/// [`ProviderError::InvalidHandle`] on the root handle of an extraction is
/// escalated to [`ExtractionError::ProviderUnavailable`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The element does not expose this attribute
    #[error("attribute not supported: {0}")]
    Unsupported(String),

    /// The accessibility backend cannot be reached at all
    #[error("accessibility provider unavailable: {0}")]
    Unavailable(String),

    /// The handle does not refer to a live element
    #[error("invalid element handle: {0}")]
    InvalidHandle(String),

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl ProviderError {
    /// Whether this error means the provider cannot serve the element at all
    pub fn is_fatal_for_root(&self) -> bool {
        matches!(
            self,
            ProviderError::Unavailable(_) | ProviderError::InvalidHandle(_)
        )
    }
}

/// Errors from an extraction call.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The provider could not serve the requested root at all.
    /// Distinct from a missing attribute, which is never an error.
    #[error("provider unavailable for root element: {0}")]
    ProviderUnavailable(String),

    #[error("extraction cancelled")]
    Cancelled,

    #[error("extraction timed out after {0:?}")]
    TimedOut(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Error drawing a single rectangle on a canvas.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RenderError {
    #[error("rectangle has non-finite coordinates")]
    NonFinite,

    #[error("degenerate rectangle ({x0}, {y0}) -> ({x1}, {y1})")]
    Degenerate { x0: i64, y0: i64, x1: i64, y1: i64 },

    #[error("drawing backend error: {0}")]
    Backend(String),
}

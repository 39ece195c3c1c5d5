//! Error taxonomy for the render boundary.

use thiserror::Error;

/// Errors surfaced by the external render engine.
///
/// Document load and per-page render failures are expected external
/// conditions and flow back as values; they never abort the viewer.
/// `Cancelled` is not a failure in the usual sense, it marks a work item
/// whose result was discarded cooperatively.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document could not be opened or decoded.
    #[error("failed to load document: {0}")]
    DocumentLoad(String),

    /// A page number outside `1..=page_count` was requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// Rendering a single page failed; isolated to that page.
    #[error("failed to render page {0}: {1}")]
    PageRender(u32, String),

    /// The work item was cancelled before its result could be used.
    #[error("render cancelled")]
    Cancelled,
}

/// Result type for render boundary operations.
pub type RenderResult<T> = Result<T, RenderError>;

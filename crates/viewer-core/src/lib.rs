//! Viewer core: viewport state, visible-set tracking, and the
//! per-document view session.
//!
//! This crate ties the layout engine, the render queue, and the external
//! renderer together. All shared state (layout rects, page image cache,
//! thumbnail grid) has a single writer, the [`ViewSession`], which lives
//! on the UI thread; worker results arrive through a channel and are
//! applied only when the session pumps them.

mod cache;
mod session;
mod viewport;

pub use cache::{CacheStats, PageImageCache};
pub use session::{SessionConfig, ThumbnailState, ViewSession};
pub use viewport::{
    ViewportController, ViewportState, VisibleSetDiff, DEFAULT_THUMBNAIL_SCALE, PAGE_GAP_PX,
    VISIBLE_BUFFER_PX,
};

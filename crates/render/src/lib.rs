//! Rendering boundary for the viewer core.
//!
//! The actual PDF decoding engine lives outside this workspace; everything
//! here talks to it through the [`PageRenderer`] trait. This crate also
//! owns the bitmap handle type produced by that boundary and the closed
//! set of render strategies the view session dispatches over.

mod bitmap;
mod error;
mod renderer;
mod strategy;

pub use bitmap::PageBitmap;
pub use error::{RenderError, RenderResult};
pub use renderer::{DocumentSource, PageRenderer, SurfaceId, SurfaceSize};
pub use strategy::{RenderStrategy, RenderTarget, StrategyKind};

//! Render backend selection.
//!
//! The viewer can draw into one of a closed set of backends. The strategy
//! is picked once when a session is configured; afterwards callers only
//! see the capability surface below.

use crate::error::RenderResult;
use crate::renderer::SurfaceSize;

/// Which backend a session draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// One full-page surface, repositioned on scroll.
    PageSurface,
    /// A canvas holding the flowed thumbnail grid.
    CanvasGrid,
    /// Individual image elements, one per thumbnail.
    ImageElement,
}

/// Capability surface every backend implements.
pub trait RenderTarget: Send {
    /// Draw one page at the given display scale.
    fn render(&mut self, page_number: u32, scale: f32) -> RenderResult<()>;

    /// Move the visible window.
    fn scroll(&mut self, x: f32, y: f32);

    /// Extent of the drawn content.
    fn layout_size(&self) -> SurfaceSize;

    /// Remove everything currently shown.
    fn clear_viewport(&mut self);

    /// Tear down and return to the pre-document state.
    fn reset(&mut self);
}

/// A configured backend: one variant per [`StrategyKind`], selected at
/// session construction and never swapped afterwards.
pub enum RenderStrategy {
    PageSurface(Box<dyn RenderTarget>),
    CanvasGrid(Box<dyn RenderTarget>),
    ImageElement(Box<dyn RenderTarget>),
}

impl RenderStrategy {
    pub fn new(kind: StrategyKind, target: Box<dyn RenderTarget>) -> Self {
        match kind {
            StrategyKind::PageSurface => Self::PageSurface(target),
            StrategyKind::CanvasGrid => Self::CanvasGrid(target),
            StrategyKind::ImageElement => Self::ImageElement(target),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::PageSurface(_) => StrategyKind::PageSurface,
            Self::CanvasGrid(_) => StrategyKind::CanvasGrid,
            Self::ImageElement(_) => StrategyKind::ImageElement,
        }
    }

    fn target(&mut self) -> &mut dyn RenderTarget {
        match self {
            Self::PageSurface(t) | Self::CanvasGrid(t) | Self::ImageElement(t) => t.as_mut(),
        }
    }

    pub fn render(&mut self, page_number: u32, scale: f32) -> RenderResult<()> {
        self.target().render(page_number, scale)
    }

    pub fn scroll(&mut self, x: f32, y: f32) {
        self.target().scroll(x, y);
    }

    pub fn layout_size(&mut self) -> SurfaceSize {
        self.target().layout_size()
    }

    pub fn clear_viewport(&mut self) {
        self.target().clear_viewport();
    }

    pub fn reset(&mut self) {
        self.target().reset();
    }
}

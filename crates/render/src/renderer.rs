//! External render engine boundary.

use crate::bitmap::PageBitmap;
use crate::error::RenderResult;
use paperview_doc_model::PageSizeRunList;

/// Where the document bytes come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Bytes(Vec<u8>),
    Url(String),
}

/// Opaque handle for a display surface owned by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Pixel dimensions of a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

/// The external PDF rendering collaborator.
///
/// Implementations wrap whatever engine actually decodes the document.
/// Load failures come back as `Err`; a successful load reports the page
/// count. Thumbnail rendering must be safe to call from worker threads.
pub trait PageRenderer: Send + Sync {
    /// Open a document and return its page count.
    fn load_document(&mut self, source: DocumentSource) -> RenderResult<u32>;

    /// Page sizes as an RLE list, adjacent equal sizes merged.
    fn page_size_runs(&self) -> PageSizeRunList;

    /// Render a full page into a host surface. Returns the page number
    /// rendered.
    fn render_page_to_surface(
        &self,
        page_number: u32,
        dpi: f32,
        zoom_percent: u16,
        surface: SurfaceId,
    ) -> RenderResult<u32>;

    /// Produce a thumbnail bitmap for one page at the given scale.
    fn render_thumbnail(&self, page_number: u32, scale: f32) -> RenderResult<PageBitmap>;

    /// Current pixel size of a host surface.
    fn viewport_size(&self, surface: SurfaceId) -> SurfaceSize;
}

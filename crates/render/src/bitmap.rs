//! Bitmap handle for rendered page output.

use image::RgbaImage;

/// A rendered page or thumbnail bitmap.
///
/// Carries the page number and scale it was produced at so the cache can
/// tell stale results from current ones. Dropping the handle releases the
/// pixel storage.
#[derive(Debug, Clone)]
pub struct PageBitmap {
    page_number: u32,
    scale: f32,
    image: RgbaImage,
}

impl PageBitmap {
    pub fn new(page_number: u32, scale: f32, image: RgbaImage) -> Self {
        Self { page_number, scale, image }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Memory held by the pixel buffer, in bytes.
    pub fn memory_size(&self) -> usize {
        self.image.as_raw().len()
    }
}

//! Thumbnail grid layout engine.
//!
//! Flows page rects left-to-right from the run-length-encoded size list,
//! wrapping rows against the viewport width. The computation is a pure
//! function of its inputs; the resulting rect list is owned by the caller
//! and consumed read-only by the viewport controller and renderer.

use paperview_doc_model::{PageSizeRunList, MM_PER_INCH, THUMBNAIL_DPI};

/// Placed rect for one page thumbnail.
///
/// `id` is the 1-based page number; ids are assigned in flow order and
/// always equal page numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Axis-aligned intersection test against a rectangle given by its
    /// corners. Touching edges do not intersect.
    pub fn intersects(&self, left: f32, top: f32, right: f32, bottom: f32) -> bool {
        self.x < right && self.right() > left && self.y < bottom && self.bottom() > top
    }

    /// True when the given point (in layout coordinates) falls inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Bounding size of the flowed grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutSize {
    pub width: f32,
    pub height: f32,
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailLayout {
    pub rects: Vec<LayoutRect>,
    pub total: LayoutSize,
}

impl ThumbnailLayout {
    pub fn rect_for_page(&self, page_number: u32) -> Option<&LayoutRect> {
        // Ids are sequential from 1, so the rect index is page_number - 1.
        self.rects.get(page_number.checked_sub(1)? as usize)
    }
}

/// Scaled device width/height of a page at the thumbnail DPI.
fn scaled_size_px(width_du: u32, height_du: u32, thumbnail_scale: f32) -> (f32, f32) {
    let factor = THUMBNAIL_DPI / MM_PER_INCH * thumbnail_scale;
    (width_du as f32 * factor, height_du as f32 * factor)
}

/// Compute the flowed thumbnail grid.
///
/// Pages flow left-to-right and wrap to a new row when the next scaled
/// width would exceed `viewport_width_px`; a row always accepts at least
/// one page, so a page wider than the viewport occupies a row by itself.
/// When the run list holds more than one distinct page size, each rect is
/// re-centered on its row's vertical midpoint after flowing.
pub fn compute_layout(
    runs: &PageSizeRunList,
    viewport_width_px: f32,
    thumbnail_scale: f32,
    page_gap_px: f32,
) -> ThumbnailLayout {
    let mut rects = Vec::with_capacity(runs.total_pages() as usize);

    // (index of first rect in row, row height) for the centering pass.
    let mut rows: Vec<(usize, f32)> = Vec::new();

    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut row_height = 0.0f32;
    let mut row_start = 0usize;

    for (page_number, size) in runs.pages() {
        let (width, height) = scaled_size_px(size.width_du, size.height_du, thumbnail_scale);

        if x > 0.0 && x + width > viewport_width_px {
            rows.push((row_start, row_height));
            row_start = rects.len();
            y += row_height + page_gap_px;
            x = 0.0;
            row_height = 0.0;
        }

        rects.push(LayoutRect { id: page_number, x, y, width, height });

        x += width + page_gap_px;
        row_height = row_height.max(height);
    }

    if row_start < rects.len() {
        rows.push((row_start, row_height));
    }

    // A uniform document is already row-aligned; skip the centering pass.
    if runs.distinct_size_count() > 1 {
        for (row_index, &(start, height)) in rows.iter().enumerate() {
            let end = rows.get(row_index + 1).map_or(rects.len(), |&(next, _)| next);
            for rect in &mut rects[start..end] {
                rect.y += (height - rect.height) / 2.0;
            }
        }
    }

    let total = LayoutSize {
        width: rects.iter().map(LayoutRect::right).fold(0.0, f32::max),
        height: rects.iter().map(LayoutRect::bottom).fold(0.0, f32::max),
    };

    ThumbnailLayout { rects, total }
}

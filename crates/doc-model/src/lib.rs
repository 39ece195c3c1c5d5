//! Document model shared across the viewer crates.
//!
//! Holds the run-length-encoded page-size list plus the unit and DPI
//! constants everything else derives geometry from. Page sizes are stored
//! in document units (millimeters); conversion to device pixels happens
//! at a DPI chosen by the consumer.

use serde::{Deserialize, Serialize};

/// Document units per inch (sizes are stored in millimeters).
pub const MM_PER_INCH: f32 = 25.4;

/// Native DPI for thumbnail rendering.
pub const THUMBNAIL_DPI: f32 = 72.0;

/// Native DPI for full-page rendering.
pub const PAGE_RENDER_DPI: f32 = 96.0;

/// How the document is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// A single page filling the viewport.
    Page,
    /// A virtualized grid of page thumbnails.
    Thumbnail,
}

/// Measurement system for ruler overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSystem {
    Metric,
    Imperial,
}

/// Physical size of a page in document units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageSize {
    pub width_du: u32,
    pub height_du: u32,
}

impl PageSize {
    pub fn new(width_du: u32, height_du: u32) -> Self {
        Self { width_du, height_du }
    }

    /// Width in device pixels at the given DPI.
    pub fn width_px_at(&self, dpi: f32) -> f32 {
        self.width_du as f32 / MM_PER_INCH * dpi
    }

    /// Height in device pixels at the given DPI.
    pub fn height_px_at(&self, dpi: f32) -> f32 {
        self.height_du as f32 / MM_PER_INCH * dpi
    }
}

impl Default for PageSize {
    fn default() -> Self {
        // A4
        Self { width_du: 210, height_du: 297 }
    }
}

/// A run of consecutive pages sharing the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeRun {
    pub width_du: u32,
    pub height_du: u32,
    pub count: u32,
}

impl PageSizeRun {
    pub fn new(width_du: u32, height_du: u32, count: u32) -> Self {
        Self { width_du, height_du, count }
    }

    pub fn size(&self) -> PageSize {
        PageSize::new(self.width_du, self.height_du)
    }
}

/// Run-length-encoded page-size list.
///
/// Ordered runs of `(width, height, count)`; adjacent runs with identical
/// dimensions are merged on insertion, so the encoding is canonical and
/// `total_pages()` always equals the sum of the run counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeRunList {
    runs: Vec<PageSizeRun>,
}

impl PageSizeRunList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from raw runs, merging adjacent equal sizes.
    pub fn from_runs<I>(runs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32, u32)>,
    {
        let mut list = Self::new();
        for (w, h, count) in runs {
            list.push(w, h, count);
        }
        list
    }

    /// Append a run. Zero-count runs are ignored; a run matching the tail's
    /// dimensions merges into it instead of starting a new run.
    pub fn push(&mut self, width_du: u32, height_du: u32, count: u32) {
        if count == 0 {
            return;
        }

        if let Some(last) = self.runs.last_mut() {
            if last.width_du == width_du && last.height_du == height_du {
                last.count += count;
                return;
            }
        }

        self.runs.push(PageSizeRun::new(width_du, height_du, count));
    }

    pub fn runs(&self) -> &[PageSizeRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of pages described by the list.
    pub fn total_pages(&self) -> u32 {
        self.runs.iter().map(|run| run.count).sum()
    }

    /// Number of distinct page sizes across all runs.
    ///
    /// Non-adjacent runs may repeat a size, so this deduplicates rather
    /// than counting runs.
    pub fn distinct_size_count(&self) -> usize {
        let mut sizes: Vec<PageSize> = self.runs.iter().map(|run| run.size()).collect();
        sizes.sort_by_key(|s| (s.width_du, s.height_du));
        sizes.dedup();
        sizes.len()
    }

    /// Resolve a 1-based page number to its size.
    pub fn size_of_page(&self, page_number: u32) -> Option<PageSize> {
        if page_number == 0 {
            return None;
        }

        let mut remaining = page_number;
        for run in &self.runs {
            if remaining <= run.count {
                return Some(run.size());
            }
            remaining -= run.count;
        }

        None
    }

    /// Iterate `(page_number, size)` pairs in document order, 1-based.
    pub fn pages(&self) -> impl Iterator<Item = (u32, PageSize)> + '_ {
        let mut page = 0u32;
        self.runs.iter().flat_map(move |run| {
            let start = page + 1;
            page += run.count;
            (start..start + run.count).map(move |n| (n, run.size()))
        })
    }
}

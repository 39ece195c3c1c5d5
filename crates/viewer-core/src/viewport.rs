//! Viewport state and visible-set computation.

use paperview_doc_model::{PageSize, ViewMode, PAGE_RENDER_DPI, THUMBNAIL_DPI};
use paperview_layout::ThumbnailLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Vertical inflation of the scroll rect so thumbnails just off-screen
/// are pre-rendered before they scroll into view.
pub const VISIBLE_BUFFER_PX: f32 = 200.0;

/// Gap between pages in the thumbnail grid, device pixels.
pub const PAGE_GAP_PX: f32 = 10.0;

/// Default thumbnail render scale.
pub const DEFAULT_THUMBNAIL_SCALE: f32 = 0.3;

/// Scroll, zoom and mode state for one viewport.
///
/// `zoom_percent == 0` means fit-to-view. Single owner; readers take a
/// snapshot on the UI thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub view_mode: ViewMode,
    /// Zoom in percent; 0 selects fit-to-view.
    pub zoom_percent: u16,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub viewport_width_px: f32,
    pub viewport_height_px: f32,
    pub thumbnail_scale: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Page,
            zoom_percent: 0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            viewport_width_px: 1280.0,
            viewport_height_px: 800.0,
            thumbnail_scale: DEFAULT_THUMBNAIL_SCALE,
        }
    }
}

/// Change in the visible thumbnail set after a scroll/zoom/resize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSetDiff {
    /// Newly visible: needs a placeholder and a queued render.
    pub added: Vec<u32>,
    /// No longer visible: dequeue, drop the grid item.
    pub removed: Vec<u32>,
    /// Still visible: reposition only, never re-fetch.
    pub retained: Vec<u32>,
}

impl VisibleSetDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Owns the viewport state and derives scale, position, and the visible
/// thumbnail set from it.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    state: ViewportState,
}

impl ViewportController {
    pub fn new(state: ViewportState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.state.scroll_x = x;
        self.state.scroll_y = y;
    }

    pub fn set_zoom_percent(&mut self, zoom_percent: u16) {
        self.state.zoom_percent = zoom_percent;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.view_mode = mode;
    }

    pub fn resize(&mut self, width_px: f32, height_px: f32) {
        self.state.viewport_width_px = width_px;
        self.state.viewport_height_px = height_px;
    }

    /// Display scale for the given page.
    ///
    /// Thumbnail mode always uses the fixed thumbnail scale. In page mode,
    /// zoom 0 fits the page inside the viewport (the page measured in
    /// point-equivalent pixels); any other zoom is an explicit percentage.
    pub fn display_scale(&self, page: PageSize) -> f32 {
        match self.state.view_mode {
            ViewMode::Thumbnail => self.state.thumbnail_scale,
            ViewMode::Page => {
                if self.state.zoom_percent == 0 {
                    let page_w = page.width_px_at(THUMBNAIL_DPI);
                    let page_h = page.height_px_at(THUMBNAIL_DPI);
                    if page_w <= 0.0 || page_h <= 0.0 {
                        return 1.0;
                    }
                    (self.state.viewport_width_px / page_w)
                        .min(self.state.viewport_height_px / page_h)
                } else {
                    self.state.zoom_percent as f32 / 100.0
                }
            }
        }
    }

    /// Top-left position of the page inside the viewport. Only fit-to-view
    /// in page mode centers; every other configuration anchors at the
    /// origin and lets scrolling do the rest.
    pub fn page_position(&self, page: PageSize) -> (f32, f32) {
        if self.state.view_mode != ViewMode::Page || self.state.zoom_percent != 0 {
            return (0.0, 0.0);
        }

        let scale = self.display_scale(page);
        let scaled_w = page.width_px_at(THUMBNAIL_DPI) * scale;
        let scaled_h = page.height_px_at(THUMBNAIL_DPI) * scale;
        (
            (self.state.viewport_width_px - scaled_w) / 2.0,
            (self.state.viewport_height_px - scaled_h) / 2.0,
        )
    }

    /// Logical-to-device conversion: inches per device pixel at the
    /// current display scale. Page and thumbnail views render at
    /// different native DPIs.
    pub fn pixels_to_inches(&self, page: PageSize) -> f32 {
        let native_dpi = match self.state.view_mode {
            ViewMode::Page => PAGE_RENDER_DPI,
            ViewMode::Thumbnail => THUMBNAIL_DPI,
        };
        1.0 / (native_dpi * self.display_scale(page))
    }

    /// Ids of the layout rects intersecting the inflated scroll rect.
    ///
    /// The rect is the viewport offset by the scroll position, inflated
    /// vertically by [`VISIBLE_BUFFER_PX`] so near-offscreen thumbnails
    /// render ahead of the scroll.
    pub fn visible_thumbnails(&self, layout: &ThumbnailLayout) -> BTreeSet<u32> {
        let left = self.state.scroll_x;
        let right = left + self.state.viewport_width_px;
        let top = self.state.scroll_y - VISIBLE_BUFFER_PX;
        let bottom = self.state.scroll_y + self.state.viewport_height_px + VISIBLE_BUFFER_PX;

        layout
            .rects
            .iter()
            .filter(|rect| rect.intersects(left, top, right, bottom))
            .map(|rect| rect.id)
            .collect()
    }

    /// Whether the visible set differs from what is currently
    /// materialized. Compares the sets themselves, not a checksum, so
    /// additions and removals can never cancel out.
    pub fn viewport_items_changed(
        &self,
        layout: &ThumbnailLayout,
        materialized: &BTreeSet<u32>,
    ) -> bool {
        self.visible_thumbnails(layout) != *materialized
    }

    /// Diff the visible set against the previously materialized ids.
    pub fn diff_visible(
        &self,
        layout: &ThumbnailLayout,
        previous: &BTreeSet<u32>,
    ) -> VisibleSetDiff {
        let visible = self.visible_thumbnails(layout);
        VisibleSetDiff {
            added: visible.difference(previous).copied().collect(),
            removed: previous.difference(&visible).copied().collect(),
            retained: visible.intersection(previous).copied().collect(),
        }
    }

    /// Page under a viewport point, taking the scroll offset into account.
    pub fn page_at_point(&self, layout: &ThumbnailLayout, x: f32, y: f32) -> Option<u32> {
        let layout_x = x + self.state.scroll_x;
        let layout_y = y + self.state.scroll_y;
        layout
            .rects
            .iter()
            .find(|rect| rect.contains(layout_x, layout_y))
            .map(|rect| rect.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperview_doc_model::PageSizeRunList;
    use paperview_layout::compute_layout;

    fn page_state() -> ViewportState {
        ViewportState {
            view_mode: ViewMode::Page,
            viewport_width_px: 1000.0,
            viewport_height_px: 800.0,
            ..ViewportState::default()
        }
    }

    #[test]
    fn fit_scale_never_overflows_the_constraining_axis() {
        let controller = ViewportController::new(page_state());
        for (w, h) in [(210u32, 297u32), (297, 210), (100, 1000), (1000, 100)] {
            let page = PageSize::new(w, h);
            let scale = controller.display_scale(page);
            let scaled_w = page.width_px_at(THUMBNAIL_DPI) * scale;
            let scaled_h = page.height_px_at(THUMBNAIL_DPI) * scale;
            assert!(scaled_w <= 1000.0 + 0.01);
            assert!(scaled_h <= 800.0 + 0.01);
            // One axis fills exactly.
            assert!((scaled_w - 1000.0).abs() < 0.01 || (scaled_h - 800.0).abs() < 0.01);
        }
    }

    #[test]
    fn fit_scale_matches_letter_page_scenario() {
        // US Letter is ~612x792pt; 216x279mm at 72 dpi comes out within a
        // point of that. Viewport 1000x800: the height constrains.
        let controller = ViewportController::new(page_state());
        let letter = PageSize::new(216, 279);

        let scale = controller.display_scale(letter);
        assert!((scale - 800.0 / letter.height_px_at(THUMBNAIL_DPI)).abs() < 1e-5);
        assert!((scale - 1.011).abs() < 0.01);

        let (x, y) = controller.page_position(letter);
        assert!(x > 0.0, "fit centers horizontally with nonzero offset, got {x}");
        assert!(y.abs() < 0.01);
    }

    #[test]
    fn explicit_zoom_ignores_viewport_and_does_not_center() {
        let mut state = page_state();
        state.zoom_percent = 150;
        let controller = ViewportController::new(state);

        assert_eq!(controller.display_scale(PageSize::default()), 1.5);
        assert_eq!(controller.page_position(PageSize::default()), (0.0, 0.0));
    }

    #[test]
    fn thumbnail_mode_uses_fixed_scale() {
        let mut state = page_state();
        state.view_mode = ViewMode::Thumbnail;
        state.thumbnail_scale = 0.25;
        let controller = ViewportController::new(state);

        assert_eq!(controller.display_scale(PageSize::default()), 0.25);
        assert_eq!(controller.page_position(PageSize::default()), (0.0, 0.0));
    }

    #[test]
    fn pixels_to_inches_depends_on_view_mode_dpi() {
        let mut state = page_state();
        state.zoom_percent = 100;
        let page = PageSize::default();

        let page_mode = ViewportController::new(state.clone());
        assert!((page_mode.pixels_to_inches(page) - 1.0 / 96.0).abs() < 1e-7);

        state.view_mode = ViewMode::Thumbnail;
        state.thumbnail_scale = 1.0;
        let thumb_mode = ViewportController::new(state);
        assert!((thumb_mode.pixels_to_inches(page) - 1.0 / 72.0).abs() < 1e-7);
    }

    fn thumbnail_controller(scroll_y: f32) -> ViewportController {
        ViewportController::new(ViewportState {
            view_mode: ViewMode::Thumbnail,
            viewport_width_px: 800.0,
            viewport_height_px: 600.0,
            scroll_y,
            ..ViewportState::default()
        })
    }

    #[test]
    fn visible_set_tracks_scroll_with_buffer() {
        let runs = PageSizeRunList::from_runs([(210, 297, 40)]);
        let layout = compute_layout(&runs, 800.0, 0.3, 10.0);

        let top = thumbnail_controller(0.0).visible_thumbnails(&layout);
        assert!(top.contains(&1));
        assert!(!top.contains(&40));

        let further = thumbnail_controller(2000.0).visible_thumbnails(&layout);
        assert!(!further.contains(&1));
        assert!(further.len() > 0);

        // The buffer pulls in rows just outside the viewport.
        let exact: BTreeSet<u32> = layout
            .rects
            .iter()
            .filter(|r| r.intersects(0.0, 0.0, 800.0, 600.0))
            .map(|r| r.id)
            .collect();
        assert!(top.len() >= exact.len());
    }

    #[test]
    fn items_changed_uses_set_equality_not_a_checksum() {
        let runs = PageSizeRunList::from_runs([(210, 297, 12)]);
        let layout = compute_layout(&runs, 800.0, 0.3, 10.0);
        let controller = thumbnail_controller(0.0);

        let visible = controller.visible_thumbnails(&layout);
        assert!(!controller.viewport_items_changed(&layout, &visible));

        // A different set with the same id sum must still register as
        // changed.
        let mut skewed = visible.clone();
        if skewed.remove(&2) && skewed.remove(&3) {
            skewed.insert(5000); // not even a real id
        }
        assert!(controller.viewport_items_changed(&layout, &skewed));
    }

    #[test]
    fn diff_splits_added_removed_retained() {
        let runs = PageSizeRunList::from_runs([(210, 297, 60)]);
        let layout = compute_layout(&runs, 800.0, 0.3, 10.0);

        let before = thumbnail_controller(0.0).visible_thumbnails(&layout);
        let scrolled = thumbnail_controller(600.0);
        let diff = scrolled.diff_visible(&layout, &before);

        assert!(!diff.added.is_empty());
        assert!(!diff.removed.is_empty());
        assert!(!diff.retained.is_empty());

        let after = scrolled.visible_thumbnails(&layout);
        for id in &diff.added {
            assert!(after.contains(id) && !before.contains(id));
        }
        for id in &diff.removed {
            assert!(!after.contains(id) && before.contains(id));
        }
        for id in &diff.retained {
            assert!(after.contains(id) && before.contains(id));
        }
    }

    #[test]
    fn page_at_point_accounts_for_scroll() {
        let runs = PageSizeRunList::from_runs([(210, 297, 12)]);
        let layout = compute_layout(&runs, 800.0, 0.3, 10.0);

        let controller = thumbnail_controller(0.0);
        assert_eq!(controller.page_at_point(&layout, 5.0, 5.0), Some(1));

        let first = layout.rect_for_page(1).unwrap();
        let second = layout.rect_for_page(2).unwrap();
        assert_eq!(
            controller.page_at_point(&layout, second.x + 1.0, second.y + 1.0),
            Some(2)
        );

        // Scrolled down one row, the same viewport point hits a later page.
        let scrolled = thumbnail_controller(first.height + 10.0);
        assert_eq!(scrolled.page_at_point(&layout, 5.0, 5.0), Some(5));

        // In a gap, no page.
        assert_eq!(
            controller.page_at_point(&layout, first.right() + 2.0, 5.0),
            None
        );
    }
}

//! The view session: one open document, one viewport, one render pipeline.
//!
//! All session state is mutated from the owning (UI) thread. Worker
//! threads never reach into the session; render results travel through
//! the queue's completion callback into a channel that [`ViewSession::pump_results`]
//! drains on the owner's side.

use crate::cache::PageImageCache;
use crate::viewport::{ViewportController, ViewportState, VisibleSetDiff, PAGE_GAP_PX};
use paperview_doc_model::{PageSizeRunList, ViewMode, UnitSystem, PAGE_RENDER_DPI};
use paperview_layout::{compute_layout, ThumbnailLayout};
use paperview_render::{
    DocumentSource, PageRenderer, RenderError, RenderResult, RenderStrategy, RenderTarget,
    StrategyKind, SurfaceId,
};
use paperview_ruler::{compute_ticks, Orientation, RulerTick, TickParams};
use paperview_scheduler::{
    QueueConfig, RenderOutcome, ThumbnailQueue, ThumbnailWorkerPool, WorkerPoolConfig,
};
use std::collections::BTreeMap;
use std::sync::{mpsc, Arc};

/// Display state of one materialized thumbnail grid item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailState {
    /// Placeholder shown, render queued or in flight.
    Pending,
    /// Bitmap available in the cache.
    Rendered,
    /// Render failed; placeholder stays.
    Failed,
}

/// Everything needed to assemble a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub strategy: StrategyKind,
    pub queue: QueueConfig,
    pub workers: WorkerPoolConfig,
    pub viewport: ViewportState,
    pub page_gap_px: f32,
    /// Host surface full-page renders draw into.
    pub surface: SurfaceId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::CanvasGrid,
            queue: QueueConfig::default(),
            workers: WorkerPoolConfig::default(),
            viewport: ViewportState::default(),
            page_gap_px: PAGE_GAP_PX,
            surface: SurfaceId(0),
        }
    }
}

/// An open document bound to a viewport, a render backend and a worker
/// pool. Single-threaded by construction: only the owner calls in.
pub struct ViewSession {
    controller: ViewportController,
    renderer: Arc<dyn PageRenderer>,
    runs: PageSizeRunList,
    page_count: u32,
    current_page: u32,
    layout: ThumbnailLayout,
    items: BTreeMap<u32, ThumbnailState>,
    cache: PageImageCache,
    queue: Arc<ThumbnailQueue>,
    pool: Option<ThumbnailWorkerPool>,
    strategy: RenderStrategy,
    results: mpsc::Receiver<RenderOutcome>,
    page_gap_px: f32,
    surface: SurfaceId,
}

impl std::fmt::Debug for ViewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSession")
            .field("page_count", &self.page_count)
            .field("current_page", &self.current_page)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl ViewSession {
    /// Load a document and stand up the full pipeline.
    ///
    /// Fails if the engine cannot open the source or reports zero pages.
    /// In thumbnail mode the initial visible set is queued immediately
    /// (the debounce window still applies before any render starts).
    pub fn open(
        mut renderer: Box<dyn PageRenderer>,
        source: DocumentSource,
        target: Box<dyn RenderTarget>,
        config: SessionConfig,
    ) -> RenderResult<Self> {
        let page_count = renderer.load_document(source)?;
        if page_count == 0 {
            return Err(RenderError::DocumentLoad("document has no pages".into()));
        }

        let runs = renderer.page_size_runs();
        log::info!(
            "opened document: {page_count} pages, {} distinct sizes",
            runs.distinct_size_count()
        );

        let (tx, results) = mpsc::channel();
        let queue = Arc::new(ThumbnailQueue::new(
            config.queue,
            Arc::new(move |outcome: RenderOutcome| {
                let _ = tx.send(outcome);
            }),
        ));

        let renderer: Arc<dyn PageRenderer> = Arc::from(renderer);
        let pool = ThumbnailWorkerPool::new(queue.clone(), renderer.clone(), config.workers);

        let controller = ViewportController::new(config.viewport);
        let layout = compute_layout(
            &runs,
            controller.state().viewport_width_px,
            controller.state().thumbnail_scale,
            config.page_gap_px,
        );

        let mut session = Self {
            controller,
            renderer,
            runs,
            page_count,
            current_page: 1,
            layout,
            items: BTreeMap::new(),
            cache: PageImageCache::new(),
            queue,
            pool: Some(pool),
            strategy: RenderStrategy::new(config.strategy, target),
            results,
            page_gap_px: config.page_gap_px,
            surface: config.surface,
        };

        if session.controller.state().view_mode == ViewMode::Thumbnail {
            session.sync_visible_items();
        }
        Ok(session)
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn viewport(&self) -> &ViewportState {
        self.controller.state()
    }

    pub fn layout(&self) -> &ThumbnailLayout {
        &self.layout
    }

    pub fn thumbnail_state(&self, page_number: u32) -> Option<ThumbnailState> {
        self.items.get(&page_number).copied()
    }

    pub fn cached_bitmap(&mut self, page_number: u32) -> Option<Arc<paperview_render::PageBitmap>> {
        self.cache.get(page_number)
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    /// Drain completed render results into the cache and item table.
    ///
    /// Cancelled outcomes are dropped without touching the grid; failed
    /// renders mark their item `Failed` and leave every other page alone.
    /// Returns the page numbers whose display state changed.
    pub fn pump_results(&mut self) -> Vec<u32> {
        let mut changed = Vec::new();
        while let Ok(outcome) = self.results.try_recv() {
            if outcome.cancelled {
                continue;
            }

            // Only update items still materialized; the grid may have
            // scrolled on since the render was queued.
            let Some(state) = self.items.get_mut(&outcome.page_number) else {
                continue;
            };

            match outcome.bitmap {
                Some(bitmap) => {
                    self.cache.insert(outcome.page_number, Arc::new(bitmap));
                    *state = ThumbnailState::Rendered;
                }
                None => {
                    log::warn!("thumbnail render failed for page {}", outcome.page_number);
                    *state = ThumbnailState::Failed;
                }
            }
            changed.push(outcome.page_number);
        }
        changed
    }

    /// Scroll the viewport. In thumbnail mode this re-syncs the visible
    /// set; retained thumbnails are never re-queued.
    pub fn scroll_viewport(&mut self, x: f32, y: f32) -> VisibleSetDiff {
        self.controller.scroll_to(x, y);
        self.strategy.scroll(x, y);
        if self.controller.state().view_mode == ViewMode::Thumbnail {
            self.sync_visible_items()
        } else {
            VisibleSetDiff::default()
        }
    }

    /// Change the zoom. Full-page pixels are scale-specific, so page-mode
    /// zoom changes invalidate the cache; the thumbnail scale is fixed
    /// and its cache survives.
    pub fn set_zoom_percent(&mut self, zoom_percent: u16) -> RenderResult<()> {
        self.controller.set_zoom_percent(zoom_percent);
        if self.controller.state().view_mode == ViewMode::Page {
            self.cache.clear();
            self.render_current_page()?;
        }
        Ok(())
    }

    /// Switch between page and thumbnail views. Everything derived from
    /// the previous mode is torn down: cache, queue, grid items, and the
    /// backend's viewport contents.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> RenderResult<()> {
        if self.controller.state().view_mode == mode {
            return Ok(());
        }
        log::debug!("switching view mode to {mode:?}");

        self.cache.clear();
        self.queue.clear();
        self.items.clear();
        self.strategy.clear_viewport();
        self.strategy.reset();
        self.controller.set_view_mode(mode);

        match mode {
            ViewMode::Thumbnail => {
                self.recompute_layout();
                self.sync_visible_items();
                Ok(())
            }
            ViewMode::Page => self.render_current_page(),
        }
    }

    /// Resize the viewport. The thumbnail flow depends on the width, so
    /// the layout is recomputed and the visible set re-synced.
    pub fn resize_viewport(&mut self, width_px: f32, height_px: f32) -> RenderResult<()> {
        self.controller.resize(width_px, height_px);
        match self.controller.state().view_mode {
            ViewMode::Thumbnail => {
                self.recompute_layout();
                self.sync_visible_items();
                Ok(())
            }
            ViewMode::Page => self.render_current_page(),
        }
    }

    /// Jump to a page in page mode.
    pub fn set_current_page(&mut self, page_number: u32) -> RenderResult<()> {
        if page_number == 0 || page_number > self.page_count {
            return Err(RenderError::InvalidPage(page_number));
        }
        self.current_page = page_number;
        if self.controller.state().view_mode == ViewMode::Page {
            self.render_current_page()?;
        }
        Ok(())
    }

    /// Re-render the current page into the host surface at the active
    /// zoom, then hand it to the backend at the display scale.
    pub fn render_current_page(&mut self) -> RenderResult<()> {
        let page = self
            .runs
            .size_of_page(self.current_page)
            .ok_or(RenderError::InvalidPage(self.current_page))?;
        let scale = self.controller.display_scale(page);
        let zoom = self.controller.state().zoom_percent;

        self.renderer
            .render_page_to_surface(self.current_page, PAGE_RENDER_DPI, zoom, self.surface)?;
        self.strategy.render(self.current_page, scale)
    }

    /// Reconcile the materialized grid items with the currently visible
    /// set. Departures are dequeued and dropped; arrivals reuse a cached
    /// bitmap when one exists, otherwise they go onto the render queue.
    pub fn sync_visible_items(&mut self) -> VisibleSetDiff {
        let previous: std::collections::BTreeSet<u32> = self.items.keys().copied().collect();
        if !self.controller.viewport_items_changed(&self.layout, &previous) {
            return VisibleSetDiff {
                retained: previous.into_iter().collect(),
                ..VisibleSetDiff::default()
            };
        }

        let diff = self.controller.diff_visible(&self.layout, &previous);
        for &page in &diff.removed {
            self.queue.dequeue_item(page);
            self.items.remove(&page);
        }

        let scale = self.controller.state().thumbnail_scale;
        for &page in &diff.added {
            if self.cache.contains(page) {
                self.items.insert(page, ThumbnailState::Rendered);
            } else {
                self.items.insert(page, ThumbnailState::Pending);
                self.queue.queue_item(page, scale);
            }
        }
        diff
    }

    /// Repair a thumbnail whose recorded state disagrees with the cache.
    /// A `Rendered` item with no cached bitmap is a bug in the caller's
    /// bookkeeping; it is logged and the render re-queued so the user
    /// still gets an image.
    pub fn ensure_visible(&mut self, page_number: u32) {
        let Some(state) = self.items.get(&page_number).copied() else {
            return;
        };
        if state == ThumbnailState::Rendered && !self.cache.contains(page_number) {
            debug_assert!(false, "rendered item missing from cache: page {page_number}");
            log::error!("rendered thumbnail missing from cache for page {page_number}; re-queueing");
            self.items.insert(page_number, ThumbnailState::Pending);
            self.queue
                .queue_item(page_number, self.controller.state().thumbnail_scale);
        }
    }

    /// Ruler ticks along one edge for the current viewport.
    pub fn ruler_ticks(
        &self,
        orientation: Orientation,
        unit_system: UnitSystem,
        ruler_length_px: f32,
    ) -> Vec<RulerTick> {
        let page = self
            .runs
            .size_of_page(self.current_page)
            .unwrap_or_default();
        let (offset_x, offset_y) = self.controller.page_position(page);
        let state = self.controller.state();

        let (page_offset, scroll_position) = match orientation {
            Orientation::Horizontal => (offset_x, state.scroll_x),
            Orientation::Vertical => (offset_y, state.scroll_y),
        };

        compute_ticks(&TickParams {
            orientation,
            unit_system,
            logical_scale: self.controller.pixels_to_inches(page),
            page_offset,
            scroll_position,
            ruler_length_px,
        })
    }

    fn recompute_layout(&mut self) {
        let state = self.controller.state();
        self.layout = compute_layout(
            &self.runs,
            state.viewport_width_px,
            state.thumbnail_scale,
            self.page_gap_px,
        );
    }

    /// Tear the session down: stop the workers, drop pending work.
    pub fn close(mut self) {
        self.shutdown_pool();
    }

    fn shutdown_pool(&mut self) {
        if let Some(pool) = self.pool.take() {
            self.queue.clear();
            pool.shutdown();
        }
    }
}

impl Drop for ViewSession {
    fn drop(&mut self) {
        self.shutdown_pool();
    }
}

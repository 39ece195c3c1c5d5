//! Debounced per-page work queue.
//!
//! Work items move `Queued -> Running -> Done | Cancelled`. Items sit in
//! `Queued` until the queue has seen no mutation for the settle window;
//! only then may a worker promote one to `Running`. This keeps renders
//! from starting while the user is still scrolling.

use crate::cancel::CancellationToken;
use paperview_render::{PageBitmap, RenderError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// How long the queue must stay unmutated before work may start.
    pub settle_window: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { settle_window: Duration::from_millis(500) }
    }
}

/// Lifecycle of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemState {
    Queued,
    Running,
    Cancelled,
    Done,
}

struct WorkItem {
    scale: f32,
    state: WorkItemState,
    token: CancellationToken,
    /// Scale to re-queue at once a cancelled in-flight render resolves.
    requeue: Option<f32>,
}

/// Result of one work item, delivered through the completion callback.
///
/// A cancelled item carries no bitmap; a failed render carries no bitmap
/// either but reports `cancelled: false` so the owner can show a failure
/// placeholder.
#[derive(Debug)]
pub struct RenderOutcome {
    pub page_number: u32,
    pub bitmap: Option<PageBitmap>,
    pub cancelled: bool,
}

/// Completion callback invoked for every item that reached `Running`.
pub type CompletionFn = Arc<dyn Fn(RenderOutcome) + Send + Sync>;

/// A work item promoted to `Running`, handed to a worker.
#[derive(Debug, Clone)]
pub struct ReadyItem {
    pub page_number: u32,
    pub scale: f32,
    pub token: CancellationToken,
}

/// Queue counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueStats {
    pub queued_total: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub failed: u64,
}

struct QueueState {
    items: BTreeMap<u32, WorkItem>,
    last_mutation: Instant,
    stats: QueueStats,
}

/// Debounced render queue, one live work item per page number.
pub struct ThumbnailQueue {
    settle_window: Duration,
    completion: CompletionFn,
    state: Mutex<QueueState>,
}

impl ThumbnailQueue {
    pub fn new(config: QueueConfig, completion: CompletionFn) -> Self {
        Self {
            settle_window: config.settle_window,
            completion,
            state: Mutex::new(QueueState {
                items: BTreeMap::new(),
                last_mutation: Instant::now(),
                stats: QueueStats::default(),
            }),
        }
    }

    /// Request a thumbnail for `page_number`. A page that is already
    /// queued or running is left alone. A cancelled item still waiting on
    /// its worker is marked for re-queue; `finish` re-inserts it as a
    /// fresh queued item once the stale result resolves. Restarts the
    /// debounce clock.
    pub fn queue_item(&self, page_number: u32, scale: f32) {
        let mut state = self.state.lock().unwrap();
        state.last_mutation = Instant::now();

        if let Some(item) = state.items.get_mut(&page_number) {
            if item.state == WorkItemState::Cancelled || item.token.is_cancelled() {
                item.requeue = Some(scale);
            }
            return;
        }

        log::debug!("queue thumbnail render for page {page_number}");
        state.items.insert(
            page_number,
            WorkItem {
                scale,
                state: WorkItemState::Queued,
                token: CancellationToken::new(),
                requeue: None,
            },
        );
        state.stats.queued_total += 1;
    }

    /// Withdraw a page. A queued item is dropped outright; a running item
    /// has its token cancelled and resolves through `finish`. Unknown
    /// pages are a no-op. Restarts the debounce clock.
    pub fn dequeue_item(&self, page_number: u32) {
        let mut state = self.state.lock().unwrap();
        state.last_mutation = Instant::now();

        let Some(current) = state.items.get(&page_number).map(|item| item.state) else {
            return;
        };

        match current {
            WorkItemState::Queued => {
                state.items.remove(&page_number);
                state.stats.cancelled += 1;
            }
            WorkItemState::Running => {
                log::debug!("cancelling in-flight render for page {page_number}");
                let item = state.items.get_mut(&page_number).expect("item checked above");
                item.token.cancel();
                item.state = WorkItemState::Cancelled;
            }
            WorkItemState::Cancelled | WorkItemState::Done => {
                // A pending re-queue request is withdrawn along with it.
                if let Some(item) = state.items.get_mut(&page_number) {
                    item.requeue = None;
                }
            }
        }
    }

    /// True once the settle window has elapsed with no queue mutation.
    pub fn is_settled(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.last_mutation.elapsed() >= self.settle_window
    }

    /// Promote one queued item to `Running` and hand it out, or `None`
    /// when nothing is ready or input has not settled yet.
    pub fn next_ready(&self) -> Option<ReadyItem> {
        let mut state = self.state.lock().unwrap();
        if state.last_mutation.elapsed() < self.settle_window {
            return None;
        }

        let (&page_number, item) = state
            .items
            .iter_mut()
            .find(|(_, item)| item.state == WorkItemState::Queued)?;

        item.state = WorkItemState::Running;
        Some(ReadyItem { page_number, scale: item.scale, token: item.token.clone() })
    }

    /// Resolve a running item with the renderer's result.
    ///
    /// Removes the item from the active set and fires the completion
    /// callback outside the queue lock. A result arriving after
    /// cancellation drops its bitmap and reports `cancelled: true`; if the
    /// page was re-requested in the meantime a fresh queued item takes its
    /// place. Returns the resolved state (`Done` or `Cancelled`).
    pub fn finish(
        &self,
        page_number: u32,
        result: Result<PageBitmap, RenderError>,
    ) -> WorkItemState {
        let outcome;
        let resolved;
        {
            let mut state = self.state.lock().unwrap();
            let Some(item) = state.items.remove(&page_number) else {
                // The queue was cleared while the worker was in flight.
                return WorkItemState::Cancelled;
            };

            let cancelled =
                item.state == WorkItemState::Cancelled || item.token.is_cancelled();

            if cancelled {
                state.stats.cancelled += 1;
                // The page was asked for again while the stale render was
                // still in flight; give it a fresh queued item now.
                if let Some(scale) = item.requeue {
                    state.items.insert(
                        page_number,
                        WorkItem {
                            scale,
                            state: WorkItemState::Queued,
                            token: CancellationToken::new(),
                            requeue: None,
                        },
                    );
                    state.stats.queued_total += 1;
                    state.last_mutation = Instant::now();
                }
                outcome = RenderOutcome { page_number, bitmap: None, cancelled: true };
                resolved = WorkItemState::Cancelled;
            } else {
                match result {
                    Ok(bitmap) => {
                        state.stats.completed += 1;
                        outcome =
                            RenderOutcome { page_number, bitmap: Some(bitmap), cancelled: false };
                    }
                    Err(err) => {
                        log::warn!("thumbnail render failed for page {page_number}: {err}");
                        state.stats.failed += 1;
                        outcome = RenderOutcome { page_number, bitmap: None, cancelled: false };
                    }
                }
                resolved = WorkItemState::Done;
            }
        }

        (self.completion)(outcome);
        resolved
    }

    /// Cancel everything. Queued items vanish; running items keep their
    /// slot until the worker resolves them as cancelled.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.last_mutation = Instant::now();

        let mut dropped = 0;
        state.items.retain(|_, item| match item.state {
            WorkItemState::Queued => {
                dropped += 1;
                false
            }
            _ => {
                item.token.cancel();
                true
            }
        });
        state.stats.cancelled += dropped;
    }

    /// State of a page's live work item, if any.
    pub fn item_state(&self, page_number: u32) -> Option<WorkItemState> {
        let state = self.state.lock().unwrap();
        state.items.get(&page_number).map(|item| item.state)
    }

    pub fn pending_len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .items
            .values()
            .filter(|item| item.state == WorkItemState::Queued)
            .count()
    }

    pub fn active_len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.items.len()
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock().unwrap();
        state.stats
    }
}

//! Debounced, cancellable thumbnail render scheduling.
//!
//! The queue collects per-page render requests while the user is still
//! scrolling; nothing starts until the input has settled for a debounce
//! window. Worker threads then pull ready items, invoke the external
//! renderer, and hand results back through a completion callback. Each
//! page number has at most one live work item, and cancellation is
//! cooperative: a cancelled item that still produces a bitmap discards it
//! instead of committing it.

mod cancel;
mod queue;
mod worker;

pub use cancel::CancellationToken;
pub use queue::{
    CompletionFn, QueueConfig, QueueStats, ReadyItem, RenderOutcome, ThumbnailQueue,
    WorkItemState,
};
pub use worker::{ThumbnailWorkerPool, WorkerPoolConfig};

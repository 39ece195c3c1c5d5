//! Worker threads that drain the thumbnail queue.
//!
//! Workers poll the queue for ready items once input has settled, call
//! the external renderer, and resolve each item through
//! [`ThumbnailQueue::finish`]. They never touch layout or viewport state;
//! results travel back only through the queue's completion callback.

use crate::queue::ThumbnailQueue;
use paperview_render::{PageRenderer, RenderError};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads.
    pub num_workers: usize,

    /// How long an idle worker sleeps before re-polling the queue.
    pub poll_interval: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { num_workers: 2, poll_interval: Duration::from_millis(50) }
    }
}

impl WorkerPoolConfig {
    pub fn new(num_workers: usize) -> Self {
        Self { num_workers, ..Self::default() }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Pool of polling render workers.
///
/// Each worker pulls a ready item, checks its cancellation token before
/// dispatching to the renderer and relies on the queue to re-check it
/// when the result arrives. Shut down on session teardown.
pub struct ThumbnailWorkerPool {
    workers: Vec<Worker>,
    shutdown: Arc<AtomicBool>,
}

impl ThumbnailWorkerPool {
    pub fn new(
        queue: Arc<ThumbnailQueue>,
        renderer: Arc<dyn PageRenderer>,
        config: WorkerPoolConfig,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let workers = (0..config.num_workers.max(1))
            .map(|id| {
                Worker::spawn(
                    id,
                    queue.clone(),
                    renderer.clone(),
                    shutdown.clone(),
                    config.poll_interval,
                )
            })
            .collect();

        Self { workers, shutdown }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Signal all workers and wait for them to exit. In-flight renders
    /// finish first and resolve through the queue as usual.
    pub fn shutdown(self) {
        self.shutdown.store(true, Ordering::Release);
        for worker in self.workers {
            worker.join();
        }
    }
}

struct Worker {
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(
        id: usize,
        queue: Arc<ThumbnailQueue>,
        renderer: Arc<dyn PageRenderer>,
        shutdown: Arc<AtomicBool>,
        poll_interval: Duration,
    ) -> Self {
        let thread = thread::Builder::new()
            .name(format!("thumbnail-worker-{id}"))
            .spawn(move || Self::run(queue, renderer, shutdown, poll_interval))
            .expect("failed to spawn thumbnail worker");

        Self { thread: Some(thread) }
    }

    fn run(
        queue: Arc<ThumbnailQueue>,
        renderer: Arc<dyn PageRenderer>,
        shutdown: Arc<AtomicBool>,
        poll_interval: Duration,
    ) {
        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            let Some(ready) = queue.next_ready() else {
                thread::sleep(poll_interval);
                continue;
            };

            // Checkpoint before dispatch; the queue re-checks the token
            // once the result comes back.
            let result = if ready.token.is_cancelled() {
                Err(RenderError::Cancelled)
            } else {
                renderer.render_thumbnail(ready.page_number, ready.scale)
            };

            queue.finish(ready.page_number, result);
        }
    }

    fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

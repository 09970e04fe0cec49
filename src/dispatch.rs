//! Caller-context completion scheduling
//!
//! A relay never runs a completion handler on its own terms; it posts the
//! handler to a [`CompletionContext`]. [`InlineContext`] runs it straight away
//! on the relay task. [`completion_queue`] gives a looper-style queue that the
//! caller drains on whatever thread or task it wants results on.

use tokio::sync::mpsc;

/// A completion handler bound to its result, ready to run.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

pub trait CompletionContext: Send + Sync {
    fn post(&self, job: Completion);
}

/// Runs completions on the relay's own task.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContext;

impl CompletionContext for InlineContext {
    fn post(&self, job: Completion) {
        job();
    }
}

/// Sending half of a completion queue. Cheap to clone.
#[derive(Clone)]
pub struct CompletionQueue {
    tx: mpsc::UnboundedSender<Completion>,
}

/// Receiving half of a completion queue, owned by the caller's context.
pub struct QueueDriver {
    rx: mpsc::UnboundedReceiver<Completion>,
}

pub fn completion_queue() -> (CompletionQueue, QueueDriver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionQueue { tx }, QueueDriver { rx })
}

impl CompletionContext for CompletionQueue {
    fn post(&self, job: Completion) {
        if self.tx.send(job).is_err() {
            // The caller tore its context down; the handler target is gone.
            tracing::debug!("Completion queue closed, dropping completion");
        }
    }
}

impl QueueDriver {
    /// Wait for the next completion and run it here.
    ///
    /// Returns `false` once every [`CompletionQueue`] handle is gone and the
    /// queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run every completion already queued without waiting. Returns how many
    /// ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_job(counter: &Arc<AtomicUsize>) -> Completion {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_inline_context_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        InlineContext.post(counting_job(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_queue_defers_until_driven() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, mut driver) = completion_queue();

        queue.post(counting_job(&counter));
        queue.post(counting_job(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(driver.run_pending(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(driver.run_pending(), 0);
    }

    #[tokio::test]
    async fn test_run_next_reports_closed_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, mut driver) = completion_queue();

        queue.post(counting_job(&counter));
        drop(queue);

        assert!(driver.run_next().await);
        assert!(!driver.run_next().await);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_post_after_driver_dropped_is_discarded() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, driver) = completion_queue();
        drop(driver);

        queue.post(counting_job(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}

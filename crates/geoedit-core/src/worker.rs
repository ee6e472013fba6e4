//! Background worker queue
//!
//! Long-running geometry work (buffering, painting, transforming large
//! selections) is handed to a [`WorkerQueue`] so the interactive thread is
//! never blocked. A job runs off-thread; its [`Completion`] is queued and
//! picked up by the owner with [`WorkerQueue::try_next`], which is the only
//! point where results re-enter editor state.
//!
//! Every job carries the generation counter of the session that enqueued it
//! so stale results can be recognised and dropped.

use std::collections::VecDeque;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// A unit of work executed by a worker queue.
pub type Job<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// The result of a finished job, tagged with the generation it was started in.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    pub generation: u64,
    pub result: T,
}

/// Runs jobs away from the interactive thread and marshals results back.
pub trait WorkerQueue<T> {
    /// Starts `job`. The result becomes visible through [`Self::try_next`].
    fn enqueue(&mut self, generation: u64, job: Job<T>);

    /// Returns the next finished job, if any. Never blocks.
    fn try_next(&mut self) -> Option<Completion<T>>;
}

/// Runs each job synchronously inside `enqueue`.
///
/// Used by tests and headless drivers where there is no interactive thread to
/// keep responsive. Completions are still delivered through `try_next`, so the
/// caller-side protocol is identical to [`TokioWorker`].
#[derive(Debug)]
pub struct InlineWorker<T> {
    done: VecDeque<Completion<T>>,
}

impl<T> InlineWorker<T> {
    pub fn new() -> Self {
        Self {
            done: VecDeque::new(),
        }
    }
}

impl<T> Default for InlineWorker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkerQueue<T> for InlineWorker<T> {
    fn enqueue(&mut self, generation: u64, job: Job<T>) {
        let result = job();
        self.done.push_back(Completion { generation, result });
    }

    fn try_next(&mut self) -> Option<Completion<T>> {
        self.done.pop_front()
    }
}

/// Runs jobs on the blocking pool of a tokio runtime.
pub struct TokioWorker<T> {
    handle: Handle,
    tx: UnboundedSender<Completion<T>>,
    rx: UnboundedReceiver<Completion<T>>,
}

impl<T: Send + 'static> TokioWorker<T> {
    /// Creates a worker that spawns onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self { handle, tx, rx }
    }

    /// Creates a worker bound to the runtime of the calling context, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl<T: Send + 'static> WorkerQueue<T> for TokioWorker<T> {
    fn enqueue(&mut self, generation: u64, job: Job<T>) {
        let tx = self.tx.clone();
        self.handle.spawn_blocking(move || {
            let result = job();
            if tx.send(Completion { generation, result }).is_err() {
                tracing::debug!("Worker result for generation {} dropped, receiver gone", generation);
            }
        });
    }

    fn try_next(&mut self) -> Option<Completion<T>> {
        self.rx.try_recv().ok()
    }
}

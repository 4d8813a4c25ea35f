//! Fixed-capacity asynchronous worker pool
//!
//! The pool owns a set of worker tasks draining a shared job queue. It is
//! constructed explicitly by the composition root and passed by reference to
//! whoever needs it; there is no process-wide implicit executor.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::utils::error::{Result, TrackerError};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Why a submitted task did not produce a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task panicked; the panic was captured and did not disturb the
    /// worker or any sibling task
    Panicked(String),
    /// The task was dropped before completion, either because the pool shut
    /// down before it ran or because shutdown cancelled it mid-flight
    Cancelled,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Panicked(message) => write!(f, "task panicked: {}", message),
            TaskError::Cancelled => write!(f, "task cancelled"),
        }
    }
}

impl std::error::Error for TaskError {}

/// Handle to a submitted task's eventual result
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<std::result::Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task to resolve
    pub async fn join(self) -> std::result::Result<T, TaskError> {
        match self.receiver.await {
            Ok(outcome) => outcome,
            // The job was dropped without sending: shutdown cancelled it.
            Err(_) => Err(TaskError::Cancelled),
        }
    }
}

/// Fixed-capacity concurrent task executor
///
/// At most `capacity` submitted tasks execute simultaneously; the submit
/// queue itself is unbounded (batch sizes are finite and known up front).
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    cancel_tx: watch::Sender<bool>,
    shutting_down: AtomicBool,
    active: Arc<AtomicUsize>,
    capacity: usize,
}

impl WorkerPool {
    /// Create a pool with the given number of workers (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let active = Arc::new(AtomicUsize::new(0));

        let workers = (0..capacity)
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let cancel = cancel_rx.clone();
                let active = Arc::clone(&active);
                tokio::spawn(worker_loop(worker_id, receiver, cancel, active))
            })
            .collect();

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            cancel_tx,
            shutting_down: AtomicBool::new(false),
            active,
            capacity,
        }
    }

    /// Create a pool sized to the number of available CPUs
    pub fn with_default_capacity() -> Self {
        Self::new(num_cpus::get())
    }

    /// Maximum number of concurrently executing tasks
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently executing
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Whether shutdown has started
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Enqueue a task for execution on the next available worker
    ///
    /// The returned handle resolves to the task's value, or to a captured
    /// `TaskError` if the task panicked or was cancelled. A panic inside the
    /// task is never rethrown on a caller's context and never takes down a
    /// worker or sibling task.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = AssertUnwindSafe(task).catch_unwind().await;
            let _ = done_tx.send(match outcome {
                Ok(value) => Ok(value),
                Err(panic) => Err(TaskError::Panicked(panic_message(panic.as_ref()))),
            });
        });

        let sender = self.sender.lock();
        let accepted = match sender.as_ref() {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        };
        if accepted {
            Ok(TaskHandle { receiver: done_rx })
        } else {
            Err(TrackerError::Processing(
                "worker pool is shut down".to_string(),
            ))
        }
    }

    /// Stop accepting submissions and wait for in-flight and queued tasks
    ///
    /// Waits up to `timeout`; if the timeout elapses, remaining tasks are
    /// signalled to cancel (observed cooperatively at their next suspension
    /// point) and the call returns once the workers have stopped. Calling
    /// shutdown a second time returns immediately.
    pub async fn shutdown(&self, timeout: Duration) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        // Dropping the sender closes the queue: workers drain what is left
        // and exit.
        self.sender.lock().take();

        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        if handles.is_empty() {
            return;
        }

        let join = join_all(handles);
        tokio::pin!(join);
        if tokio::time::timeout(timeout, join.as_mut()).await.is_err() {
            warn!(
                "worker pool shutdown timed out after {:?}, cancelling remaining tasks",
                timeout
            );
            let _ = self.cancel_tx.send(true);
            join.await;
        }
        debug!("worker pool stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>,
    mut cancel: watch::Receiver<bool>,
    active: Arc<AtomicUsize>,
) {
    loop {
        // Hold the queue lock only while dequeuing, never while running.
        let job = {
            let mut queue = receiver.lock().await;
            match queue.recv().await {
                Some(job) => job,
                None => break,
            }
        };

        active.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = job => {}
            _ = cancelled(&mut cancel) => {
                debug!(worker_id, "task cancelled during shutdown");
            }
        }
        active.fetch_sub(1, Ordering::SeqCst);
    }
    debug!(worker_id, "worker stopped");
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            // Sender gone without ever signalling: cancellation can no
            // longer happen.
            std::future::pending::<()>().await;
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

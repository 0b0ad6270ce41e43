//! Thread pool backing worker systems.
//!
//! A fixed-size pool of worker threads fed through a crossbeam channel.
//! [`Executor::spawn`] hands a job to the pool and returns a [`TaskFuture`]
//! whose [`wait`](TaskFuture::wait) blocks on a completion channel. The
//! scheduler uses this to dispatch a worker system's job after extraction
//! and to block at the phase barrier until the result is back.
//!
//! Jobs are `Send + 'static` by construction: a worker system's extract step
//! serializes everything the job needs into an owned message before
//! dispatch, so nothing borrowed ever crosses the thread boundary.

use crossbeam::channel::{Receiver, Sender, unbounded};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Job(Job),
    Shutdown,
}

/// A fixed-size thread pool executing submitted jobs in FIFO order.
///
/// Completion order is non-deterministic; callers sequence results through
/// the returned futures. Dropping the executor shuts the pool down and joins
/// every worker.
pub struct Executor {
    sender: Sender<Message>,
    workers: Vec<Worker>,
}

struct Worker {
    handle: Option<thread::JoinHandle<()>>,
}

impl Executor {
    /// Create a pool with `size` worker threads.
    ///
    /// `size` must be greater than zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "executor pool size must be greater than 0");

        let (sender, receiver) = unbounded();
        let workers = (0..size)
            .map(|index| Worker::new(index, receiver.clone()))
            .collect();

        Self { sender, workers }
    }

    /// A pool with a single worker thread.
    pub fn single_threaded() -> Self {
        Self::new(1)
    }

    /// Submit a job and return a future resolving to its result.
    pub fn spawn<F, T>(&self, job: F) -> TaskFuture<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = crossbeam::channel::bounded(1);
        let wrapped = Box::new(move || {
            let result = job();
            let _ = tx.send(result);
        });
        // If the pool is already shut down the future's channel disconnects
        // and wait() reports the loss.
        let _ = self.sender.send(Message::Job(wrapped));
        TaskFuture { receiver: rx }
    }

    /// Number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        for _ in &self.workers {
            let _ = self.sender.send(Message::Shutdown);
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Worker {
    fn new(index: usize, receiver: Receiver<Message>) -> Self {
        let handle = thread::Builder::new()
            .name(format!("ecs-worker-{index}"))
            .spawn(move || {
                loop {
                    match receiver.recv() {
                        Ok(Message::Job(job)) => job(),
                        Ok(Message::Shutdown) | Err(_) => break,
                    }
                }
            })
            .ok();
        Self { handle }
    }
}

/// The pending result of a spawned job.
pub struct TaskFuture<T> {
    receiver: Receiver<T>,
}

impl<T> TaskFuture<T> {
    /// Block until the job completes and return its result.
    pub fn wait(self) -> Result<T, TaskError> {
        self.receiver.recv().map_err(|_| TaskError::Lost)
    }

    /// Poll for the result without blocking. `Ok(None)` means not ready
    /// yet.
    pub fn try_wait(&self) -> Result<Option<T>, TaskError> {
        match self.receiver.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(crossbeam::channel::TryRecvError::Empty) => Ok(None),
            Err(crossbeam::channel::TryRecvError::Disconnected) => Err(TaskError::Lost),
        }
    }
}

/// A job's result never arrived: the job panicked or the pool shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// The completion channel disconnected before delivering a result.
    Lost,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn spawn_and_wait_returns_result() {
        // Given
        let executor = Executor::new(2);

        // When
        let future = executor.spawn(|| 21 * 2);

        // Then
        assert_eq!(future.wait().unwrap(), 42);
    }

    #[test]
    fn many_jobs_complete_with_their_own_results() {
        // Given
        let executor = Executor::new(4);

        // When
        let futures: Vec<_> = (0..10).map(|i| executor.spawn(move || i * 2)).collect();
        let results: Vec<_> = futures.into_iter().map(|f| f.wait().unwrap()).collect();

        // Then - each future resolves to its own job's output
        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
    }

    #[test]
    fn try_wait_reports_pending_then_ready() {
        // Given
        let executor = Executor::single_threaded();
        let future = executor.spawn(|| {
            thread::sleep(Duration::from_millis(80));
            7
        });

        // Then - not ready immediately
        assert_eq!(future.try_wait().unwrap(), None);

        // And eventually ready
        thread::sleep(Duration::from_millis(150));
        assert_eq!(future.try_wait().unwrap(), Some(7));
    }

    #[test]
    fn drop_joins_outstanding_work() {
        // Given
        let executor = Executor::new(2);
        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            let _ = executor.spawn(move || {
                thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        // When - drop blocks until workers drain the queue
        drop(executor);

        // Then
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn pool_reports_size() {
        assert_eq!(Executor::new(3).size(), 3);
        assert_eq!(Executor::single_threaded().size(), 1);
    }
}

//! Bounded worker pool for independent subproblem solves.

use crate::error::{CspError, CspResult};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct PoolState {
    in_flight: usize,
    closed: bool,
}

/// A dedicated rayon thread pool with explicit shutdown.
///
/// Batches submitted through [`WorkerPool::run_all`] run to completion on
/// the pool's threads; the caller blocks until every job of the batch has
/// returned. [`WorkerPool::shutdown`] stops accepting batches, waits for
/// running ones up to a timeout, then raises the cancellation token handed
/// to every job.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    state: Mutex<PoolState>,
    idle: Condvar,
    cancel: Arc<AtomicBool>,
}

/// Decrements the in-flight count even if a job panics.
struct BatchGuard<'a> {
    pool: &'a WorkerPool,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.pool.lock();
        state.in_flight -= 1;
        if state.in_flight == 0 {
            self.pool.idle.notify_all();
        }
    }
}

impl WorkerPool {
    /// Starts a pool of `num_threads` workers.
    ///
    /// # Errors
    ///
    /// [`CspError::WorkerPool`] if the threads cannot be spawned.
    pub fn new(num_threads: usize) -> CspResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("u-csp-worker-{i}"))
            .build()
            .map_err(|e| CspError::WorkerPool(e.to_string()))?;
        Ok(Self {
            pool,
            state: Mutex::new(PoolState::default()),
            idle: Condvar::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().closed
    }

    /// Runs `f` over every job in parallel and returns the results in job
    /// order.
    ///
    /// Each call receives the pool's cancellation token. Returns `None`
    /// without running anything once the pool is shut down.
    pub fn run_all<T, R, F>(&self, jobs: &[T], f: F) -> Option<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T, Arc<AtomicBool>) -> R + Sync,
    {
        {
            let mut state = self.lock();
            if state.closed {
                return None;
            }
            state.in_flight += 1;
        }
        let _guard = BatchGuard { pool: self };

        let cancel = &self.cancel;
        let results: Vec<R> = self
            .pool
            .install(|| jobs.par_iter().map(|job| f(job, Arc::clone(cancel))).collect());
        Some(results)
    }

    /// Stops accepting work and waits up to `timeout` for running batches.
    ///
    /// Returns `true` if everything finished in time. Otherwise the
    /// cancellation token is raised, so running searches stop at their
    /// next check, and `false` is returned without waiting further.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let mut state = self.lock();
        state.closed = true;
        let (state, _) = self
            .idle
            .wait_timeout_while(state, timeout, |s| s.in_flight > 0)
            .unwrap_or_else(PoisonError::into_inner);

        if state.in_flight == 0 {
            tracing::debug!("worker pool drained");
            return true;
        }
        tracing::warn!(
            in_flight = state.in_flight,
            timeout_ms = timeout.as_millis() as u64,
            "worker pool did not drain in time; cancelling running searches"
        );
        self.cancel.store(true, Ordering::Relaxed);
        false
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.num_threads())
            .field("state", &*self.lock())
            .finish()
    }
}

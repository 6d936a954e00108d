// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded worker pool for `spawn_thread` commands.
//!
//! Jobs run on tokio's blocking pool, gated by a semaphore holding one permit
//! per worker. Each job acquires the core lock before it runs, so a job only
//! ever observes fully applied state. Admission is bounded: at most
//! `capacity` jobs may wait for a permit at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tracing::error;

use crate::engine::{CoreGuard, CoreLock};
use crate::errors::PoolError;

pub type Job = Box<dyn FnOnce(&mut CoreGuard<'_>) + Send + 'static>;

/// Admission slot in the queue. Released when the job starts running or is
/// dropped unscheduled.
#[derive(Debug)]
pub struct Ticket {
    queued: Arc<AtomicUsize>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.queued.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct WorkerPool {
    runtime: Option<Runtime>,
    permits: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
    capacity: usize,
    threads: usize,
    core: Weak<CoreLock>,
    closed: AtomicBool,
}

impl WorkerPool {
    pub fn new(threads: usize, capacity: usize, core: Weak<CoreLock>) -> std::io::Result<Self> {
        let threads = threads.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(threads)
            .thread_name("playcore-worker")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime: Some(runtime),
            permits: Arc::new(Semaphore::new(threads)),
            queued: Arc::new(AtomicUsize::new(0)),
            capacity: capacity.max(1),
            threads,
            core,
            closed: AtomicBool::new(false),
        })
    }

    /// Claims a queue slot. Fails when the pool is closed or full.
    pub fn reserve(&self) -> Result<Ticket, PoolError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }
        let before = self.queued.fetch_add(1, Ordering::AcqRel);
        let ticket = Ticket {
            queued: Arc::clone(&self.queued),
        };
        if before >= self.capacity {
            return Err(PoolError::Full(before));
        }
        Ok(ticket)
    }

    /// Schedules `job`. It runs with the core lock held once a worker is free.
    pub fn spawn(&self, ticket: Ticket, job: Job) -> Result<(), PoolError> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(PoolError::Closed);
        };
        let permits = Arc::clone(&self.permits);
        let core = self.core.clone();
        runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            drop(ticket);
            let joined = tokio::task::spawn_blocking(move || {
                let Some(lock) = core.upgrade() else {
                    return;
                };
                let mut guard = lock.lock();
                job(&mut guard);
            })
            .await;
            if let Err(e) = joined {
                error!(error = %e, "Worker job terminated abnormally");
            }
        });
        Ok(())
    }

    /// Rejects further reservations. Already queued jobs still run.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: usize) -> WorkerPool {
        WorkerPool::new(1, capacity, Weak::new()).unwrap()
    }

    #[test]
    fn test_admission_is_bounded() {
        let pool = pool(2);
        let a = pool.reserve().unwrap();
        let _b = pool.reserve().unwrap();
        assert_eq!(pool.reserve().unwrap_err(), PoolError::Full(2));
        drop(a);
        assert!(pool.reserve().is_ok());
    }

    #[test]
    fn test_closed_pool_rejects() {
        let pool = pool(4);
        pool.close();
        assert_eq!(pool.reserve().unwrap_err(), PoolError::Closed);
        assert_eq!(pool.queued(), 0);
    }
}

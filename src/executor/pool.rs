//! Per-capability worker pools
//!
//! Each registered capability owns a fixed set of workers, the idle subset,
//! and a FIFO queue of tasks waiting for a worker. Dispatch guarantees
//! at-most-one task per worker and never drops a dispatched task.

#![allow(dead_code)]

use futures::future::join_all;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::Task;
use crate::config::{CapabilityRegistry, ConfigError};
use crate::driver::{Driver, Session};

/// Pool operation errors
#[derive(Error, Debug)]
pub enum PoolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Driver(#[from] crate::driver::DriverError),
}

/// A reusable execution unit bound to one capability
pub struct Worker {
    id: usize,
    capability: String,
    session: Arc<dyn Session>,
}

impl Worker {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }
}

/// Mutable pool state for one capability.
///
/// All three collections move together under one lock; a worker is busy
/// exactly when it is in `workers` but not in `idle`.
struct PoolState {
    workers: Vec<Arc<Worker>>,
    idle: Vec<Arc<Worker>>,
    pending: VecDeque<Arc<Task>>,
    /// Set by `cleanup()`; a shut-down pool never re-admits workers.
    shutdown: bool,
}

struct CapabilityPool {
    state: Arc<Mutex<PoolState>>,
}

/// Pool counters for introspection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub idle: usize,
    pub pending: usize,
}

/// Worker pools for every registered capability
pub struct BrowserPool {
    driver: Arc<dyn Driver>,
    registry: CapabilityRegistry,
    pools: HashMap<String, CapabilityPool>,
    next_worker_id: AtomicUsize,
}

impl BrowserPool {
    /// Create one empty pool per registered capability
    pub fn new(registry: CapabilityRegistry, driver: Arc<dyn Driver>) -> Self {
        let pools = registry
            .iter()
            .map(|capability| {
                let pool = CapabilityPool {
                    state: Arc::new(Mutex::new(PoolState {
                        workers: Vec::new(),
                        idle: Vec::new(),
                        pending: VecDeque::new(),
                        shutdown: false,
                    })),
                };
                (capability.name.clone(), pool)
            })
            .collect();

        Self {
            driver,
            registry,
            pools,
            next_worker_id: AtomicUsize::new(0),
        }
    }

    fn pool(&self, capability: &str) -> Result<&CapabilityPool, ConfigError> {
        self.pools
            .get(capability)
            .ok_or_else(|| ConfigError::UnknownCapability(capability.to_string()))
    }

    /// Open `count` sessions for the capability and add the new workers to
    /// both the full set and the idle set.
    ///
    /// On a session-open failure the workers opened so far are still
    /// registered, so a subsequent `cleanup()` quits their sessions.
    pub async fn add_workers(&self, capability: &str, count: usize) -> Result<(), PoolError> {
        let pool = self.pool(capability)?;
        let config = self.registry.get(capability)?;

        info!("Starting {} {} worker(s)", count, capability);

        // Sessions are opened outside the pool lock.
        let mut workers = Vec::with_capacity(count);
        let mut failure = None;
        for _ in 0..count {
            match self.driver.new_session(config).await {
                Ok(session) => workers.push(Arc::new(Worker {
                    id: self.next_worker_id.fetch_add(1, Ordering::SeqCst),
                    capability: capability.to_string(),
                    session,
                })),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let mut state = pool.state.lock().await;
        for worker in workers {
            state.idle.push(Arc::clone(&worker));
            state.workers.push(worker);
        }
        drop(state);

        match failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Assign the task to an idle worker, or queue it (FIFO) if none is free.
    ///
    /// The idle check and the checkout happen in a single critical section;
    /// a worker popped here is busy before the lock is released.
    pub async fn dispatch(&self, task: Arc<Task>) -> Result<(), PoolError> {
        let pool = self.pool(task.capability())?;

        let mut state = pool.state.lock().await;
        match state.idle.pop() {
            Some(worker) => {
                // The worker left the idle set under the lock; it is busy
                // before anyone else can observe the pool.
                drop(state);
                debug!("Dispatching '{}' to worker {}", task.name(), worker.id());
                run_worker(Arc::clone(&pool.state), worker, task);
            }
            None => {
                debug!("No idle {} worker, queueing '{}'", task.capability(), task.name());
                state.pending.push_back(task);
            }
        }
        Ok(())
    }

    /// Quit every worker's session across all capabilities, exactly once
    /// each and concurrently. Individual shutdown failures are logged and
    /// swallowed; they never surface to the reporter.
    pub async fn cleanup(&self) {
        let mut retired: Vec<Arc<Worker>> = Vec::new();
        for pool in self.pools.values() {
            let mut state = pool.state.lock().await;
            state.shutdown = true;
            state.idle.clear();
            retired.append(&mut state.workers);
        }

        info!("Shutting down {} worker(s)", retired.len());

        let quits = retired.iter().map(|worker| async move {
            if let Err(err) = worker.session.quit().await {
                warn!(
                    "Shutdown of {} worker {} failed: {err}",
                    worker.capability(),
                    worker.id()
                );
            }
        });
        join_all(quits).await;
    }

    /// Current counters for one capability's pool
    pub async fn stats(&self, capability: &str) -> Option<PoolStats> {
        let pool = self.pools.get(capability)?;
        let state = pool.state.lock().await;
        Some(PoolStats {
            workers: state.workers.len(),
            idle: state.idle.len(),
            pending: state.pending.len(),
        })
    }
}

/// Worker loop: run the assigned task, then keep draining the capability's
/// queue; the worker only returns to the idle set when the queue is empty.
fn run_worker(state: Arc<Mutex<PoolState>>, worker: Arc<Worker>, task: Arc<Task>) {
    tokio::spawn(async move {
        let mut current = task;
        loop {
            current.run(Arc::clone(&worker.session)).await;

            let mut guard = state.lock().await;
            match guard.pending.pop_front() {
                Some(next) => {
                    debug!(
                        "Worker {} picking up queued task '{}'",
                        worker.id(),
                        next.name()
                    );
                    current = next;
                }
                None => {
                    // A drained pool never gets its (quit) worker back.
                    if !guard.shutdown {
                        guard.idle.push(worker);
                    }
                    break;
                }
            }
        }
    });
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded worker pool for copy tasks.
//
// Built on a dedicated tokio runtime whose blocking pool is capped at the
// requested worker count: `spawn_blocking` runs at most that many jobs at
// once and queues the rest without limit. Copy jobs are plain blocking I/O,
// so they never touch the async side of the runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error};

use uri_to_file_core::error::Result;

/// Default number of concurrent copy workers.
pub const DEFAULT_WORKERS: usize = 3;

/// Fixed-size pool that runs jobs off the calling thread.
///
/// Create one per plugin and keep it for the plugin's lifetime. Jobs cannot be
/// cancelled once submitted.
pub struct TaskExecutor {
    runtime: Option<Runtime>,
    workers: usize,
    submitted: Arc<AtomicUsize>,
}

impl TaskExecutor {
    /// Pool running at most `workers` jobs concurrently (minimum 1).
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name("uri-to-file-worker")
            .build()?;
        debug!(workers, "copy executor started");
        Ok(Self {
            runtime: Some(runtime),
            workers,
            submitted: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Total jobs handed to this pool so far.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Queue `job`. Returns immediately; there is no backpressure.
    ///
    /// A panicking job is logged and swallowed; it never takes the pool down.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        let seq = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = runtime.spawn_blocking(job);
        runtime.spawn(async move {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!(job = seq, "copy job panicked");
                } else {
                    debug!(job = seq, "copy job dropped before running");
                }
            }
        });
    }
}

impl Drop for TaskExecutor {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        // A blocking shutdown is not allowed from inside an async context.
        if tokio::runtime::Handle::try_current().is_ok() {
            runtime.shutdown_background();
        } else {
            drop(runtime);
        }
    }
}

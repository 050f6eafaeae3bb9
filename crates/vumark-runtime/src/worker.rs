//! Background worker
//!
//! Runs jobs that must not stall the UI thread or frame delivery: the
//! (potentially blocking) engine initialization and delayed follow-ups such
//! as restoring the camera focus mode.

use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};

use vumark_core::{ArError, ArResult};

/// Executor for blocking and delayed jobs.
///
/// Three flavours:
/// - [`BackgroundWorker::new`] owns a small tokio runtime
/// - [`BackgroundWorker::with_handle`] borrows an existing runtime
/// - [`BackgroundWorker::inline`] runs every job on the caller, immediately,
///   ignoring delays. Completion messages still go through the UI queue, so
///   ordering seen by the controller is unchanged.
pub struct BackgroundWorker {
    runtime: Option<Runtime>,
    handle: Option<Handle>,
}

impl BackgroundWorker {
    pub fn new() -> ArResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("vumark-worker")
            .enable_time()
            .build()
            .map_err(|e| ArError::Worker(e.to_string()))?;
        let handle = runtime.handle().clone();

        Ok(BackgroundWorker {
            runtime: Some(runtime),
            handle: Some(handle),
        })
    }

    pub fn with_handle(handle: Handle) -> Self {
        BackgroundWorker {
            runtime: None,
            handle: Some(handle),
        }
    }

    pub fn inline() -> Self {
        BackgroundWorker {
            runtime: None,
            handle: None,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.handle.is_none()
    }

    /// Run a blocking job off the calling thread.
    pub fn spawn_blocking<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.handle {
            Some(handle) => {
                handle.spawn_blocking(job);
            }
            None => job(),
        }
    }

    /// Run a job after `delay`.
    pub fn spawn_delayed<F>(&self, delay: Duration, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.handle {
            Some(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    job();
                });
            }
            None => job(),
        }
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        // A hung engine call must not hang the host on teardown.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn test_inline_runs_immediately() {
        let worker = BackgroundWorker::inline();
        let ran = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&ran);
        worker.spawn_delayed(Duration::from_secs(60), move || {
            flag.store(true, Ordering::SeqCst);
        });

        assert!(worker.is_inline());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_owned_runtime_runs_off_thread() {
        let worker = BackgroundWorker::new().unwrap();
        let caller = std::thread::current().id();
        let (tx, rx) = mpsc::channel();

        worker.spawn_blocking(move || {
            tx.send(std::thread::current().id()).unwrap();
        });

        let worker_thread = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(worker_thread, caller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_job_waits_for_delay() {
        let worker = BackgroundWorker::with_handle(Handle::current());
        let ran = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&ran);
        worker.spawn_delayed(Duration::from_millis(500), move || {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(!ran.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}

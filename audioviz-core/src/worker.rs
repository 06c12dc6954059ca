//! Background Worker
//!
//! A thread that calls an injected body in a loop until it is asked to stop
//! or the body breaks. The stop flag is checked between iterations, so an
//! in-flight iteration (for example a blocking device read) always runs to
//! completion first.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle to a running repeat-until-stopped thread.
///
/// Dropping the handle stops the worker and waits for it.
pub struct Worker {
    name: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start a named thread running `body` repeatedly.
    pub fn spawn<F>(name: impl Into<String>, mut body: F) -> std::io::Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let name = name.into();
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let label = name.clone();

        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            tracing::debug!(worker = %label, "worker started");
            while flag.load(Ordering::Acquire) {
                if body().is_break() {
                    break;
                }
            }
            flag.store(false, Ordering::Release);
            tracing::debug!(worker = %label, "worker stopped");
        })?;

        Ok(Self {
            name,
            running,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the loop is still iterating.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the loop to stop and wait for the current iteration to finish.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(worker = %self.name, "worker thread panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn worker_runs_until_stopped() {
        let iterations = Arc::new(AtomicUsize::new(0));
        let counter = iterations.clone();

        let mut worker = Worker::spawn("test-loop", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(1));
            ControlFlow::Continue(())
        })
        .unwrap();

        while iterations.load(Ordering::SeqCst) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        worker.stop();
        assert!(!worker.is_running());

        let after_stop = iterations.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(iterations.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn worker_ends_when_body_breaks() {
        let mut remaining = 2;
        let mut worker = Worker::spawn("test-break", move || {
            remaining -= 1;
            if remaining == 0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        while worker.is_running() {
            thread::sleep(Duration::from_millis(1));
        }
        worker.stop();
        assert_eq!(worker.name(), "test-break");
    }
}

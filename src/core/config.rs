//! Worker pool configuration.
//!
//! Kernels run on rayon's global pool unless the caller installs a
//! dedicated one. [`ProcessingConfig`] builds that pool with a bounded
//! thread count and runs closures inside it:
//!
//! ```ignore
//! let config = ProcessingConfig::new().with_threads(4);
//! let pool = config.build_pool()?;
//! let gray = pool.install(|| grayscale_weighted(&image))?;
//! ```

use crate::core::error::RawlabResult;
use log::debug;

/// Prefix used for worker thread names.
pub const DEFAULT_THREAD_NAME: &str = "rawlab-worker";

/// Configuration for the kernel worker pool.
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Number of worker threads (0 = one per hardware thread).
    pub num_threads: usize,
    /// Prefix for worker thread names.
    pub thread_name: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl ProcessingConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the worker thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Number of threads the built pool will use.
    pub fn effective_threads(&self) -> usize {
        if self.num_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.num_threads
        }
    }

    /// Build a dedicated thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::error::RawlabError::ThreadPool`] if the
    /// operating system refuses to spawn the workers.
    pub fn build_pool(&self) -> RawlabResult<rayon::ThreadPool> {
        let threads = self.effective_threads();
        debug!("building worker pool with {threads} threads");
        let prefix = self.thread_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()?;
        Ok(pool)
    }

    /// Run `op` inside a freshly built pool, blocking until it returns.
    pub fn install<R, F>(&self, op: F) -> RawlabResult<R>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        Ok(self.build_pool()?.install(op))
    }
}

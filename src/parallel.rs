//! Parallel processing configuration and management
//!
//! Index computations are sequential unless a [`ParallelConfig`] with
//! `enabled = true` is passed in through [`crate::config::IndexConfig`]. When
//! enabled, the per-cell reductions of each year run on rayon's current
//! pool. Every output cell is still computed by a single task, so results do
//! not depend on the thread count.

use crate::errors::{ClimexError, Result};
use rayon::ThreadPoolBuilder;
use serde::Deserialize;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParallelConfig {
    /// Reduce grid cells in parallel.
    #[serde(default)]
    pub enabled: bool,
    /// Size of the global pool installed by [`ParallelConfig::setup_global_pool`].
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new(enabled: bool, num_threads: Option<usize>) -> Self {
        Self {
            enabled,
            num_threads,
        }
    }

    /// Sequential execution; the library default.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Parallel execution on all available CPU cores
    pub fn all_cores() -> Self {
        Self {
            enabled: true,
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Parallel execution with a specific number of threads
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            enabled: true,
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool with the specified configuration.
    ///
    /// Rayon's global pool can only be built once per process; a second call
    /// with an explicit thread count fails with [`ClimexError::ThreadPoolError`].
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    ClimexError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {num_threads} threads: {e}"
                    ))
                })?;

            tracing::debug!(num_threads, "configured global thread pool");
        } else {
            tracing::debug!("using default thread pool configuration");
        }

        Ok(())
    }

    /// Get the current number of threads being used
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// Get information about the current parallel configuration
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Log parallel processing information at debug level
    pub fn log(&self) {
        tracing::debug!(
            current_threads = self.current_threads,
            available_cores = self.available_cores,
            available_parallelism = self.available_parallelism,
            "parallel processing environment"
        );
    }
}

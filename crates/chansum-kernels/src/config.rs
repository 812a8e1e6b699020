//! Kernel settings: worker-pool size and the parallel cut-over threshold.

use crate::error::{ChansumError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

/// Settings for [`crate::par_block_sum_with`].
///
/// Missing fields deserialize to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Worker count for a dedicated pool. `None` runs on rayon's global pool.
    pub num_threads: Option<usize>,
    /// Inputs with fewer elements than this take the sequential path.
    pub par_threshold: usize,
}

impl KernelConfig {
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_par_threshold(mut self, par_threshold: usize) -> Self {
        self.par_threshold = par_threshold;
        self
    }

    /// Build the dedicated pool, if one is configured.
    pub fn build_pool(&self) -> Result<Option<ThreadPool>> {
        let Some(n) = self.num_threads else {
            return Ok(None);
        };
        if n == 0 {
            return Err(ChansumError::ThreadPool(
                "num_threads must be at least 1".into(),
            ));
        }
        ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("chansum-worker-{i}"))
            .build()
            .map(Some)
            .map_err(|e| ChansumError::ThreadPool(e.to_string()))
    }
}

//! Optimizer configuration.

use crate::error::{CspError, CspResult};
use crate::model::{CspProblem, Payload};
use crate::search::SearchConfig;
use std::time::Duration;

/// Configuration for [`Optimizer`](super::Optimizer).
///
/// A problem takes the large-scale path (domain reduction, decomposition,
/// parallel solving) when any of the three size measures exceeds its
/// threshold; otherwise it is reordered and solved directly.
///
/// # Examples
///
/// ```
/// use u_csp::optim::OptimizerConfig;
/// use std::time::Duration;
///
/// let config = OptimizerConfig::default()
///     .with_variable_threshold(200)
///     .with_cache_ttl(Duration::from_secs(600))
///     .with_num_workers(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizerConfig {
    /// Variable count above which the large-scale path is taken.
    pub variable_threshold: usize,

    /// Constraint count above which the large-scale path is taken.
    pub constraint_threshold: usize,

    /// Mean domain size above which the large-scale path is taken.
    pub avg_domain_threshold: f64,

    /// Whether solved problems are cached.
    pub cache_enabled: bool,

    /// Maximum number of cached solutions.
    pub cache_capacity: usize,

    /// Time after which a cached solution expires.
    pub cache_ttl: Duration,

    /// Worker threads for subproblems. 0 uses the available parallelism.
    pub num_workers: usize,

    /// How long [`Optimizer::shutdown`](super::Optimizer::shutdown) waits
    /// for running subproblems before cancelling them.
    pub shutdown_timeout: Duration,

    /// Search settings, including the strategy.
    pub search: SearchConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            variable_threshold: 1000,
            constraint_threshold: 500,
            avg_domain_threshold: 50.0,
            cache_enabled: true,
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(60 * 60),
            num_workers: 0,
            shutdown_timeout: Duration::from_secs(30),
            search: SearchConfig::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn with_variable_threshold(mut self, n: usize) -> Self {
        self.variable_threshold = n;
        self
    }

    pub fn with_constraint_threshold(mut self, n: usize) -> Self {
        self.constraint_threshold = n;
        self
    }

    pub fn with_avg_domain_threshold(mut self, size: f64) -> Self {
        self.avg_domain_threshold = size;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// [`CspError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> CspResult<()> {
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(CspError::InvalidConfig(
                "cache_capacity must be positive when the cache is enabled".into(),
            ));
        }
        if self.avg_domain_threshold.is_nan() || self.avg_domain_threshold < 0.0 {
            return Err(CspError::InvalidConfig(format!(
                "avg_domain_threshold must be non-negative, got {}",
                self.avg_domain_threshold
            )));
        }
        if self.search.step_multiplier == 0 {
            return Err(CspError::InvalidConfig("step_multiplier must be positive".into()));
        }
        if let Some(annealing) = &self.search.annealing {
            annealing.validate()?;
        }
        Ok(())
    }

    /// Whether `problem` exceeds any large-scale threshold.
    pub fn is_large<P: Payload>(&self, problem: &CspProblem<P>) -> bool {
        problem.variable_count() > self.variable_threshold
            || problem.constraint_count() > self.constraint_threshold
            || problem.average_domain_size() > self.avg_domain_threshold
    }

    /// Worker count with 0 resolved to the available parallelism.
    pub fn effective_workers(&self) -> usize {
        if self.num_workers > 0 {
            return self.num_workers;
        }
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }
}

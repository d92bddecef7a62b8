//! The optimizer front end: cache, path selection and merging.

use super::cache::{CacheStats, ProblemFingerprint, SolutionCache};
use super::config::OptimizerConfig;
use super::decompose::decompose;
use super::ordering::VariableOrdering;
use super::pool::WorkerPool;
use super::reduce::{reduce_domains, removed_count};
use crate::error::{CspError, CspResult};
use crate::model::{Assignment, CspProblem, Payload};
use crate::search::{SearchConfig, SearchResult, SearchRunner, SearchStats, SolveStatus, Strategy};
use std::num::NonZeroUsize;
use std::time::Instant;

/// Which route produced an [`OptimizeResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolvePath {
    /// Served from the solution cache.
    Cached,
    /// Reordered and solved as one problem.
    Standard,
    /// Reduced, split and solved per group.
    Decomposed { subproblems: usize },
}

/// Result of [`Optimizer::solve`].
#[derive(Debug, Clone)]
pub struct OptimizeResult<P: Payload = ()> {
    pub status: SolveStatus,

    /// The solution; present exactly when `status` is `Solved`.
    pub assignment: Option<Assignment<P>>,

    /// Counters summed over every search run; `elapsed` is the wall-clock
    /// time of the whole call.
    pub stats: SearchStats,

    pub path: SolvePath,
}

impl<P: Payload> OptimizeResult<P> {
    pub fn is_solved(&self) -> bool {
        self.status.is_solved()
    }
}

/// Union of the sub-assignments, if every subproblem was solved.
///
/// Subproblems are variable-disjoint, so the union never needs conflict
/// resolution. A single unsolved part makes the whole merge fail.
pub fn merge<P: Payload>(parts: &[SearchResult<P>]) -> Option<Assignment<P>> {
    let mut merged = Assignment::new();
    for part in parts {
        merged.extend(part.assignment.as_ref()?);
    }
    Some(merged)
}

/// Wraps the search engine with caching, static variable ordering and,
/// for large problems, domain reduction, decomposition and parallel
/// solving.
///
/// # Examples
///
/// ```
/// use u_csp::constraints::AllDifferent;
/// use u_csp::model::{CspProblem, Value, Variable};
/// use u_csp::optim::{Optimizer, OptimizerConfig, SolvePath};
///
/// let (x, y) = (Variable::named("x"), Variable::named("y"));
/// let problem = CspProblem::builder()
///     .variable(x.clone(), [Value::named("A"), Value::named("B")])
///     .variable(y.clone(), [Value::named("A"), Value::named("B")])
///     .constraint(AllDifferent::new("x != y", vec![x, y]))
///     .build()
///     .unwrap();
///
/// let optimizer = Optimizer::new(OptimizerConfig::default()).unwrap();
/// let first = optimizer.solve(&problem);
/// assert!(first.is_solved());
/// assert_eq!(first.path, SolvePath::Standard);
///
/// let again = optimizer.solve(&problem);
/// assert_eq!(again.path, SolvePath::Cached);
/// assert_eq!(again.assignment, first.assignment);
/// ```
pub struct Optimizer<P: Payload = ()> {
    config: OptimizerConfig,
    cache: Option<SolutionCache<P>>,
    pool: WorkerPool,
    ordering: VariableOrdering<P>,
}

impl<P: Payload> Optimizer<P> {
    /// Validates `config` and starts the worker pool.
    ///
    /// # Errors
    ///
    /// [`CspError::InvalidConfig`] for an invalid configuration,
    /// [`CspError::WorkerPool`] if the worker threads cannot start.
    pub fn new(config: OptimizerConfig) -> CspResult<Self> {
        config.validate()?;
        let cache = if config.cache_enabled {
            let capacity = NonZeroUsize::new(config.cache_capacity)
                .ok_or_else(|| CspError::InvalidConfig("cache_capacity must be positive".into()))?;
            Some(SolutionCache::new(capacity, config.cache_ttl))
        } else {
            None
        };
        let pool = WorkerPool::new(config.effective_workers())?;
        Ok(Self {
            config,
            cache,
            pool,
            ordering: VariableOrdering::standard(),
        })
    }

    /// Replaces the standard-path variable ordering.
    pub fn with_ordering(mut self, ordering: VariableOrdering<P>) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Solves with the configured strategy.
    pub fn solve(&self, problem: &CspProblem<P>) -> OptimizeResult<P> {
        self.solve_with_strategy(problem, self.config.search.strategy)
    }

    /// Solves with `strategy` in place of the configured one.
    pub fn solve_with_strategy(&self, problem: &CspProblem<P>, strategy: Strategy) -> OptimizeResult<P> {
        let span = tracing::info_span!(
            "csp_optimize",
            %strategy,
            variables = problem.variable_count(),
            constraints = problem.constraint_count(),
        );
        let _guard = span.enter();
        let start = Instant::now();
        let search = self.config.search.clone().with_strategy(strategy);

        let key = ProblemFingerprint::of(problem, strategy);
        if let Some(assignment) = self.cached(key, problem) {
            tracing::info!(fingerprint = key.value(), "served from cache");
            return OptimizeResult {
                status: SolveStatus::Solved,
                assignment: Some(assignment),
                stats: SearchStats {
                    elapsed: start.elapsed(),
                    ..SearchStats::default()
                },
                path: SolvePath::Cached,
            };
        }

        let mut result = if self.config.is_large(problem) {
            self.solve_large(problem, &search)
        } else {
            self.solve_standard(problem, &search)
        };
        result.stats.elapsed = start.elapsed();

        if let (Some(cache), Some(assignment)) = (&self.cache, &result.assignment) {
            cache.insert(key, assignment.clone());
        }
        tracing::info!(status = %result.status, path = ?result.path, summary = %result.stats.summary(), "optimize finished");
        result
    }

    fn cached(&self, key: ProblemFingerprint, problem: &CspProblem<P>) -> Option<Assignment<P>> {
        let assignment = self.cache.as_ref()?.get(key)?;
        let in_domains = assignment
            .iter()
            .all(|(var, value)| problem.domain_of(var).is_some_and(|domain| domain.contains(value)));
        if in_domains && problem.is_solution(&assignment) {
            Some(assignment)
        } else {
            tracing::warn!(fingerprint = key.value(), "cached assignment does not solve this problem; ignoring it");
            None
        }
    }

    fn solve_standard(&self, problem: &CspProblem<P>, search: &SearchConfig) -> OptimizeResult<P> {
        let order = self.ordering.order(problem);
        let ordered = problem.reordered(&order);
        let result = SearchRunner::run(&ordered, search);
        OptimizeResult {
            status: result.status,
            assignment: result.assignment,
            stats: result.stats,
            path: SolvePath::Standard,
        }
    }

    fn solve_large(&self, problem: &CspProblem<P>, search: &SearchConfig) -> OptimizeResult<P> {
        let reduced = reduce_domains(problem);
        tracing::info!(removed = removed_count(problem.domains(), &reduced), "domains reduced");

        let parts = match decompose(problem, &reduced) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(error = %e, "decomposition failed; solving as one problem");
                let whole = problem.with_domains(reduced).unwrap_or_else(|_| problem.clone());
                let mut result = self.solve_standard(&whole, search);
                result.path = SolvePath::Decomposed { subproblems: 1 };
                return result;
            }
        };
        tracing::info!(subproblems = parts.len(), "problem decomposed");

        let results = match self
            .pool
            .run_all(&parts, |sub, cancel| SearchRunner::run_with_cancel(sub, search, Some(cancel)))
        {
            Some(results) => results,
            None => {
                tracing::warn!("worker pool is shut down; solving subproblems sequentially");
                parts.iter().map(|sub| SearchRunner::run(sub, search)).collect()
            }
        };

        let mut stats = SearchStats::default();
        for r in &results {
            stats.accumulate(&r.stats);
        }
        let assignment = merge(&results);
        let status = results
            .iter()
            .map(|r| r.status)
            .find(|s| !s.is_solved())
            .unwrap_or(SolveStatus::Solved);

        OptimizeResult {
            status,
            assignment,
            stats,
            path: SolvePath::Decomposed {
                subproblems: parts.len(),
            },
        }
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(SolutionCache::stats)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Shuts the worker pool down.
    ///
    /// Waits up to `shutdown_timeout` for running subproblems, then
    /// cancels the rest. Returns whether the pool drained in time. Later
    /// large-scale solves run their subproblems on the calling thread.
    pub fn shutdown(&self) -> bool {
        self.pool.shutdown(self.config.shutdown_timeout)
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.is_shut_down()
    }
}

impl<P: Payload> std::fmt::Debug for Optimizer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimizer")
            .field("config", &self.config)
            .field("cache", &self.cache_stats())
            .field("pool", &self.pool)
            .field("ordering", &self.ordering.rule_names())
            .finish()
    }
}

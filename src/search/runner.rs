//! Search entry point and result types.

use super::config::{SearchConfig, Strategy};
use super::{backtracking, min_conflicts};
use crate::model::{Assignment, CspProblem, Payload};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// A complete assignment satisfying every hard constraint was found.
    Solved,
    /// The search space was exhausted, or min-conflicts ran out of steps.
    NoSolution,
    /// The configured time limit expired.
    Timeout,
    /// The cancellation flag was raised.
    Cancelled,
}

impl SolveStatus {
    pub fn is_solved(self) -> bool {
        self == SolveStatus::Solved
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Solved => "solved",
            SolveStatus::NoSolution => "no solution",
            SolveStatus::Timeout => "timeout",
            SolveStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Per-solve performance counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Search nodes entered (min-conflicts: steps taken).
    pub nodes_explored: u64,

    /// Failed branches below a consistent value (min-conflicts: restarts).
    pub backtracks: u64,

    /// Wall-clock duration of the solve.
    pub elapsed: Duration,
}

impl SearchStats {
    /// One-line summary: `"Nodes: N, Backtracks: B, Time: Tms"`.
    pub fn summary(&self) -> String {
        format!(
            "Nodes: {}, Backtracks: {}, Time: {}ms",
            self.nodes_explored,
            self.backtracks,
            self.elapsed.as_millis()
        )
    }

    /// Adds the counters of `other`, as for subproblems solved one after
    /// another.
    pub fn accumulate(&mut self, other: &SearchStats) {
        self.nodes_explored += other.nodes_explored;
        self.backtracks += other.backtracks;
        self.elapsed += other.elapsed;
    }
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct SearchResult<P: Payload = ()> {
    pub status: SolveStatus,

    /// The solution; present exactly when `status` is `Solved`.
    pub assignment: Option<Assignment<P>>,

    pub stats: SearchStats,
}

impl<P: Payload> SearchResult<P> {
    pub fn is_solved(&self) -> bool {
        self.status.is_solved()
    }
}

/// What a strategy reports back to the runner.
pub(crate) enum Outcome<P: Payload> {
    Found(Assignment<P>),
    Exhausted,
    Interrupted(SolveStatus),
}

/// Cancellation flag and deadline shared by every strategy.
pub(crate) struct Budget {
    cancel: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl Budget {
    pub(crate) fn new(cancel: Option<Arc<AtomicBool>>, time_limit: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: time_limit.map(|limit| Instant::now() + limit),
        }
    }

    /// The status to stop with, if the search must stop now.
    pub(crate) fn interrupted(&self) -> Option<SolveStatus> {
        if let Some(ref flag) = self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(SolveStatus::Cancelled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(SolveStatus::Timeout),
            _ => None,
        }
    }
}

/// Runs the configured search strategy over a problem.
///
/// # Examples
///
/// ```
/// use u_csp::constraints::AllDifferent;
/// use u_csp::model::{CspProblem, Value, Variable};
/// use u_csp::search::{SearchConfig, SearchRunner, SolveStatus};
///
/// let (x, y) = (Variable::named("x"), Variable::named("y"));
/// let problem = CspProblem::builder()
///     .variable(x.clone(), [Value::named("A"), Value::named("B")])
///     .variable(y.clone(), [Value::named("A")])
///     .constraint(AllDifferent::new("x != y", vec![x.clone(), y.clone()]))
///     .build()
///     .unwrap();
///
/// let result = SearchRunner::run(&problem, &SearchConfig::default());
/// assert_eq!(result.status, SolveStatus::Solved);
/// let solution = result.assignment.unwrap();
/// assert_eq!(solution.get(&x).map(|v| v.id()), Some("B"));
/// ```
pub struct SearchRunner;

impl SearchRunner {
    /// Solves `problem` with `config`.
    pub fn run<P: Payload>(problem: &CspProblem<P>, config: &SearchConfig) -> SearchResult<P> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Solves `problem` with an optional cancellation token.
    ///
    /// Raising the flag ends the search with [`SolveStatus::Cancelled`] at
    /// the next node or step.
    pub fn run_with_cancel<P: Payload>(
        problem: &CspProblem<P>,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SearchResult<P> {
        let span = tracing::debug_span!(
            "csp_search",
            strategy = %config.strategy,
            variables = problem.variable_count(),
            constraints = problem.constraint_count(),
        );
        let _guard = span.enter();

        let start = Instant::now();
        let budget = Budget::new(cancel, config.time_limit);
        let mut stats = SearchStats::default();

        let outcome = match config.strategy {
            Strategy::ForwardChecking | Strategy::Ac3 => {
                backtracking::solve(problem, config, &budget, &mut stats)
            }
            Strategy::MinConflicts => min_conflicts::solve(problem, config, &budget, &mut stats),
        };
        stats.elapsed = start.elapsed();

        let (status, assignment) = match outcome {
            Outcome::Found(assignment) => (SolveStatus::Solved, Some(assignment)),
            Outcome::Exhausted => (SolveStatus::NoSolution, None),
            Outcome::Interrupted(status) => (status, None),
        };
        tracing::debug!(%status, summary = %stats.summary(), "search finished");

        SearchResult {
            status,
            assignment,
            stats,
        }
    }
}

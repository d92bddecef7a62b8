//! Search engine: finds a complete assignment satisfying every hard
//! constraint, or reports that none was found.
//!
//! # Strategies
//!
//! - [`Strategy::ForwardChecking`]: backtracking, MRV variable choice,
//!   LCV value order, forward checking after each assignment. Complete.
//! - [`Strategy::Ac3`]: the same backtracking with AC-3 enforced at every
//!   node instead of forward checking. Complete.
//! - [`Strategy::MinConflicts`]: local repair from a random assignment.
//!   Incomplete; optionally restarted.
//!
//! Failure to find a solution is a [`SolveStatus`], never an error.
//!
//! # References
//!
//! - Haralick & Elliott (1980), "Increasing tree search efficiency for
//!   constraint satisfaction problems"
//! - Mackworth (1977), "Consistency in networks of relations"
//! - Minton et al. (1992), "Minimizing conflicts: a heuristic repair
//!   method for constraint satisfaction and scheduling problems"

mod ac3;
mod backtracking;
mod config;
mod consistency;
mod domains;
mod heuristics;
mod min_conflicts;
mod runner;

pub use config::{Annealing, SearchConfig, Strategy, ValueOrder};
pub use runner::{SearchResult, SearchRunner, SearchStats, SolveStatus};

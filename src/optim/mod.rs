//! Optimization layer around the search engine.
//!
//! - **Cache**: solved problems are remembered by structural fingerprint,
//!   bounded by LRU eviction and a time-to-live.
//! - **Standard path**: variables are ranked once by a static priority and
//!   the reordered problem is searched directly.
//! - **Large-scale path**: hard constraints prune domains, union-find over
//!   scopes splits the problem into independent groups, the groups are
//!   solved on a worker pool and the results merged only if every group
//!   succeeded.

mod cache;
mod config;
mod decompose;
mod optimizer;
mod ordering;
mod pool;
mod reduce;

pub use cache::{CacheStats, ProblemFingerprint, SolutionCache};
pub use config::OptimizerConfig;
pub use decompose::{connected_groups, decompose};
pub use optimizer::{merge, OptimizeResult, Optimizer, SolvePath};
pub use ordering::{
    ConstraintDegree, Degree, DomainDegreeRatio, DomainTightness, HardDegree, OrderingRule, VariableOrdering,
};
pub use pool::WorkerPool;
pub use reduce::reduce_domains;

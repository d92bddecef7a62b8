//! Error types.
//!
//! Only structural problems and caller mistakes are errors. An instance
//! without a solution is reported through
//! [`SolveStatus`](crate::search::SolveStatus), never through [`CspError`].

use thiserror::Error;

/// Result alias used throughout the crate.
pub type CspResult<T> = Result<T, CspError>;

/// Errors raised while building a problem or configuring a solver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CspError {
    /// A constraint scope names a variable that was never declared.
    #[error("constraint `{constraint}` references undeclared variable `{variable}`")]
    UnknownVariable {
        /// Name of the offending constraint.
        constraint: String,
        /// Identifier of the missing variable.
        variable: String,
    },

    /// Two variables were declared with the same identifier.
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),

    /// The variable and domain lists passed to a problem differ in length.
    #[error("{variables} variable(s) but {domains} domain(s)")]
    DomainCountMismatch {
        /// Number of variables supplied.
        variables: usize,
        /// Number of domains supplied.
        domains: usize,
    },

    /// A strategy selector could not be parsed.
    #[error("unknown solving strategy: `{0}`")]
    UnknownStrategy(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker threads could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

//! Domain model: variables, values, assignments, constraints and problems.
//!
//! # Key Components
//!
//! - [`Variable`]: a slot requiring a value, e.g. "teacher for section 3"
//! - [`Value`]: a candidate for a variable, carrying a typed payload
//! - [`Assignment`]: a partial or complete mapping, copied per branch
//! - [`Constraint`]: the capability every rule implements
//! - [`CspProblem`]: variables, domains and constraints, validated at build

mod assignment;
mod constraint;
mod problem;
mod value;
mod variable;

pub use assignment::Assignment;
pub use constraint::{Constraint, ConstraintResult, Priority};
pub use problem::{CspProblem, CspProblemBuilder, Evaluation, SharedConstraint, Violation};
pub use value::{Payload, Value, ValueKind};
pub use variable::{Variable, VariableKind};

//! Constraint satisfaction engine for timetabling and resource assignment.
//!
//! Assigns scarce resources (teachers, rooms, time slots) to activities so
//! that no hard rule is broken, with soft preferences scored alongside.
//!
//! - **Model** ([`model`]): variables, typed values, assignments, the
//!   [`Constraint`](model::Constraint) capability and validated problems.
//! - **Constraints** ([`constraints`]): reusable kinds such as
//!   all-different, availability and capacity.
//! - **Search** ([`search`]): backtracking with forward checking or AC-3,
//!   MRV/LCV ordering, and min-conflicts local search.
//! - **Optimization** ([`optim`]): solution cache, static ordering, domain
//!   reduction, decomposition and parallel solving.
//!
//! # Quick start
//!
//! ```
//! use u_csp::constraints::AllDifferent;
//! use u_csp::model::{CspProblem, Value, Variable};
//! use u_csp::search::{SearchConfig, SearchRunner};
//!
//! let slots = || [Value::named("MON-1"), Value::named("MON-2")];
//! let math = Variable::named("math");
//! let physics = Variable::named("physics");
//!
//! let problem = CspProblem::builder()
//!     .variable(math.clone(), slots())
//!     .variable(physics.clone(), slots())
//!     .constraint(AllDifferent::new("same teacher", vec![math.clone(), physics.clone()]))
//!     .build()?;
//!
//! let result = SearchRunner::run(&problem, &SearchConfig::default());
//! let timetable = result.assignment.expect("two slots for two classes");
//! assert_ne!(timetable.get(&math), timetable.get(&physics));
//! # Ok::<(), u_csp::CspError>(())
//! ```
//!
//! Not finding a solution is an ordinary outcome reported through
//! [`SolveStatus`](search::SolveStatus). Only malformed problems and
//! invalid configurations produce a [`CspError`].

pub mod constraints;
pub mod error;
pub mod model;
pub mod optim;
pub mod search;

pub use error::{CspError, CspResult};

//! Reusable constraint kinds.
//!
//! Every kind here implements [`Constraint`](crate::model::Constraint) and
//! is dispatched through that trait only; embedding applications are free
//! to add their own kinds next to these.
//!
//! - [`AllDifferent`]: no double booking within the scope
//! - [`ForbiddenCombination`]: one forbidden tuple of values
//! - [`AllowedValues`]: availability of a single variable
//! - [`Capacity`]: payload capacity must cover a requirement
//! - [`PreferValues`]: soft preference-score threshold
//! - [`Predicate`]: arbitrary closure over the scope's values

mod all_different;
mod forbidden;
mod predicate;
mod preference;
mod unary;

pub use all_different::AllDifferent;
pub use forbidden::ForbiddenCombination;
pub use predicate::Predicate;
pub use preference::PreferValues;
pub use unary::{AllowedValues, Capacity};

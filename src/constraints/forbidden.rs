//! Forbidden value combinations.

use crate::error::{CspError, CspResult};
use crate::model::{Assignment, Constraint, ConstraintResult, Payload, Priority, Variable};

/// Forbids one specific tuple of values over the scope.
///
/// `ForbiddenCombination::new("no-AA", vec![x, y], vec!["A", "A"])` rejects
/// exactly the assignment `x = A, y = A`.
#[derive(Debug, Clone)]
pub struct ForbiddenCombination {
    name: String,
    scope: Vec<Variable>,
    values: Vec<String>,
    priority: Priority,
}

impl ForbiddenCombination {
    /// A hard constraint forbidding `values[i]` on `scope[i]` for all `i` at once.
    ///
    /// # Errors
    ///
    /// [`CspError::InvalidConfig`] if `scope` and `values` differ in length.
    pub fn try_new<S: Into<String>>(
        name: impl Into<String>,
        scope: Vec<Variable>,
        values: Vec<S>,
    ) -> CspResult<Self> {
        let name = name.into();
        if scope.len() != values.len() {
            return Err(CspError::InvalidConfig(format!(
                "forbidden combination `{name}`: {} scope variable(s) but {} value(s)",
                scope.len(),
                values.len()
            )));
        }
        Ok(Self {
            name,
            scope,
            values: values.into_iter().map(Into::into).collect(),
            priority: Priority::Hard,
        })
    }

    /// Like [`ForbiddenCombination::try_new`], for literal tuples.
    ///
    /// # Panics
    ///
    /// Panics if `scope` and `values` differ in length.
    pub fn new<S: Into<String>>(name: impl Into<String>, scope: Vec<Variable>, values: Vec<S>) -> Self {
        match Self::try_new(name, scope, values) {
            Ok(constraint) => constraint,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl<P: Payload> Constraint<P> for ForbiddenCombination {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn scope(&self) -> &[Variable] {
        &self.scope
    }

    fn validate(&self, assignment: &Assignment<P>) -> ConstraintResult {
        let matches = self
            .scope
            .iter()
            .zip(&self.values)
            .all(|(var, id)| assignment.get(var).is_some_and(|v| v.id() == id));
        if matches {
            ConstraintResult::violated_with(
                format!("{}: forbidden combination {:?}", self.name, self.values),
                1.0,
                self.scope.iter().map(|v| v.id().to_string()).collect(),
            )
        } else {
            ConstraintResult::satisfied()
        }
    }
}

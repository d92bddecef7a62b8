//! Closure-backed constraints.

use crate::model::{Assignment, Constraint, ConstraintResult, Payload, Priority, Value, Variable};
use std::fmt;

type Check<P> = Box<dyn Fn(&[&Value<P>]) -> bool + Send + Sync>;

/// A constraint defined by a predicate over the scope's values.
///
/// The predicate receives the values in scope order and returns whether
/// the constraint holds. It is only called once every scope variable is
/// assigned. An empty scope makes a global constraint whose predicate
/// receives an empty slice.
///
/// # Examples
///
/// ```
/// use u_csp::constraints::Predicate;
/// use u_csp::model::{Assignment, Constraint, Value, Variable};
///
/// let (x, y) = (Variable::named("x"), Variable::named("y"));
/// let same = Predicate::new("same", vec![x.clone(), y.clone()], |v: &[&Value]| v[0] == v[1]);
///
/// let a: Assignment = [(x, Value::named("A")), (y, Value::named("B"))].into_iter().collect();
/// assert!(!same.validate(&a).satisfied);
/// ```
pub struct Predicate<P = ()> {
    name: String,
    scope: Vec<Variable>,
    check: Check<P>,
    priority: Priority,
    message: String,
}

impl<P: Payload> Predicate<P> {
    /// A hard constraint backed by `check`.
    pub fn new(
        name: impl Into<String>,
        scope: Vec<Variable>,
        check: impl Fn(&[&Value<P>]) -> bool + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        Self {
            message: format!("{name} violated"),
            name,
            scope,
            check: Box::new(check),
            priority: Priority::Hard,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Message reported on violation.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl<P: Payload> Constraint<P> for Predicate<P> {
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
        let values: Option<Vec<&Value<P>>> = self.scope.iter().map(|v| assignment.get(v)).collect();
        match values {
            Some(values) if !(self.check)(&values) => ConstraintResult::violated_with(
                self.message.clone(),
                1.0,
                self.scope.iter().map(|v| v.id().to_string()).collect(),
            ),
            _ => ConstraintResult::satisfied(),
        }
    }
}

impl<P> fmt::Debug for Predicate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("priority", &self.priority)
            .finish()
    }
}

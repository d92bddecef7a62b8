//! Single-variable constraints: availability and capacity.
//!
//! Both decide in isolation, so domain reduction removes every value they
//! reject before search starts.

use crate::model::{Assignment, Constraint, ConstraintResult, Payload, Priority, Value, Variable};
use std::collections::HashSet;
use std::fmt;

/// The variable must take one of an allowed set of value ids.
///
/// Models teacher availability ("only these slots") or room eligibility.
#[derive(Debug, Clone)]
pub struct AllowedValues {
    name: String,
    scope: [Variable; 1],
    allowed: HashSet<String>,
    priority: Priority,
}

impl AllowedValues {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        variable: Variable,
        allowed: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: [variable],
            allowed: allowed.into_iter().map(Into::into).collect(),
            priority: Priority::Hard,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl<P: Payload> Constraint<P> for AllowedValues {
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
        let var = &self.scope[0];
        match assignment.get(var) {
            Some(value) if !self.allowed.contains(value.id()) => ConstraintResult::violated_with(
                format!("{}: {} is not available for {}", self.name, value.label(), var.label()),
                1.0,
                vec![var.id().to_string(), value.id().to_string()],
            ),
            _ => ConstraintResult::satisfied(),
        }
    }

    fn prune(
        &self,
        _assignment: &Assignment<P>,
        variable: &Variable,
        domain: &[Value<P>],
    ) -> Vec<Value<P>> {
        if variable != &self.scope[0] {
            return domain.to_vec();
        }
        domain
            .iter()
            .filter(|v| self.allowed.contains(v.id()))
            .cloned()
            .collect()
    }
}

/// The capacity carried by the value's payload must cover a requirement.
///
/// Models "the room must seat the expected enrollment". The score of a
/// violation is the shortfall.
pub struct Capacity<P> {
    name: String,
    scope: [Variable; 1],
    required: f64,
    capacity_of: Box<dyn Fn(&P) -> f64 + Send + Sync>,
    priority: Priority,
}

impl<P: Payload> Capacity<P> {
    pub fn new(
        name: impl Into<String>,
        variable: Variable,
        required: f64,
        capacity_of: impl Fn(&P) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            scope: [variable],
            required,
            capacity_of: Box::new(capacity_of),
            priority: Priority::Hard,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn fits(&self, value: &Value<P>) -> bool {
        (self.capacity_of)(value.payload()) >= self.required
    }
}

impl<P: Payload> Constraint<P> for Capacity<P> {
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
        let var = &self.scope[0];
        match assignment.get(var) {
            Some(value) if !self.fits(value) => {
                let capacity = (self.capacity_of)(value.payload());
                ConstraintResult::violated_with(
                    format!(
                        "{}: {} holds {capacity} but {} needs {}",
                        self.name,
                        value.label(),
                        var.label(),
                        self.required
                    ),
                    self.required - capacity,
                    vec![var.id().to_string(), value.id().to_string()],
                )
            }
            _ => ConstraintResult::satisfied(),
        }
    }

    fn prune(
        &self,
        _assignment: &Assignment<P>,
        variable: &Variable,
        domain: &[Value<P>],
    ) -> Vec<Value<P>> {
        if variable != &self.scope[0] {
            return domain.to_vec();
        }
        domain.iter().filter(|v| self.fits(v)).cloned().collect()
    }
}

impl<P> fmt::Debug for Capacity<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capacity")
            .field("name", &self.name)
            .field("variable", &self.scope[0])
            .field("required", &self.required)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueKind;

    #[test]
    fn test_allowed_values() {
        let x = Variable::named("x");
        let c = AllowedValues::new("avail", x.clone(), ["MON"]);
        let domain = vec![Value::named("MON"), Value::named("TUE")];

        let kept = c.prune(&Assignment::new(), &x, &domain);
        assert_eq!(kept, vec![Value::named("MON")]);

        let mut a = Assignment::new();
        a.assign(x.clone(), Value::named("TUE"));
        let r = c.validate(&a);
        assert!(r.is_violated());
        assert_eq!(r.affected, vec!["x", "TUE"]);
    }

    #[test]
    fn test_allowed_values_ignores_other_variables() {
        let x = Variable::named("x");
        let c = AllowedValues::new("avail", x, ["MON"]);
        let domain = vec![Value::named("TUE")];
        assert_eq!(c.prune(&Assignment::new(), &Variable::named("y"), &domain), domain);
    }

    #[test]
    fn test_capacity() {
        let x = Variable::named("section-1");
        let small = Value::new(ValueKind::Classroom, 20u32, "Room S");
        let large = Value::new(ValueKind::Classroom, 60u32, "Room L");
        let c = Capacity::new("seats", x.clone(), 30.0, |seats: &u32| *seats as f64);

        let kept = c.prune(&Assignment::new(), &x, &[small.clone(), large.clone()]);
        assert_eq!(kept, vec![large]);

        let mut a = Assignment::new();
        a.assign(x, small);
        let r = c.validate(&a);
        assert!(r.is_violated());
        assert_eq!(r.score, 10.0);
    }
}

//! No double booking.

use crate::model::{Assignment, Constraint, ConstraintResult, Payload, Priority, Variable};
use std::collections::HashMap;

/// No two variables in the scope may take values with the same id.
///
/// Models "a teacher teaches one section per slot" or "a room hosts one
/// class per slot" when the scope holds the variables competing for the
/// same resource.
#[derive(Debug, Clone)]
pub struct AllDifferent {
    name: String,
    scope: Vec<Variable>,
    priority: Priority,
}

impl AllDifferent {
    /// A hard all-different constraint.
    pub fn new(name: impl Into<String>, scope: Vec<Variable>) -> Self {
        Self {
            name: name.into(),
            scope,
            priority: Priority::Hard,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl<P: Payload> Constraint<P> for AllDifferent {
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
        let mut seen: HashMap<&str, &Variable> = HashMap::new();
        let mut clashes = 0usize;
        let mut affected = Vec::new();

        for var in &self.scope {
            let Some(value) = assignment.get(var) else {
                continue;
            };
            if let Some(first) = seen.get(value.id()) {
                clashes += 1;
                for id in [first.id(), var.id(), value.id()] {
                    if !affected.iter().any(|a: &String| a == id) {
                        affected.push(id.to_string());
                    }
                }
            } else {
                seen.insert(value.id(), var);
            }
        }

        if clashes == 0 {
            ConstraintResult::satisfied()
        } else {
            ConstraintResult::violated_with(
                format!("{}: {clashes} double booking(s)", self.name),
                clashes as f64,
                affected,
            )
        }
    }
}

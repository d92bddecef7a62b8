//! Soft preference scoring.

use crate::error::{CspError, CspResult};
use crate::model::{Assignment, Constraint, ConstraintResult, Payload, Priority, Variable};

/// Penalises scope variables whose value's preference score falls below a
/// threshold. The violation score is the summed shortfall.
///
/// This is a soft constraint: it never blocks an assignment, it only
/// contributes to [`Evaluation::soft_score`](crate::model::Evaluation).
#[derive(Debug, Clone)]
pub struct PreferValues {
    name: String,
    scope: Vec<Variable>,
    threshold: f64,
    priority: Priority,
}

impl PreferValues {
    /// # Errors
    ///
    /// [`CspError::InvalidConfig`] if `priority` is [`Priority::Hard`].
    pub fn try_new(
        name: impl Into<String>,
        scope: Vec<Variable>,
        threshold: f64,
        priority: Priority,
    ) -> CspResult<Self> {
        let name = name.into();
        if priority.is_hard() {
            return Err(CspError::InvalidConfig(format!(
                "preference `{name}` must use a soft priority"
            )));
        }
        Ok(Self {
            name,
            scope,
            threshold,
            priority,
        })
    }

    /// Like [`PreferValues::try_new`], for a priority known to be soft.
    ///
    /// # Panics
    ///
    /// Panics if `priority` is [`Priority::Hard`].
    pub fn new(name: impl Into<String>, scope: Vec<Variable>, threshold: f64, priority: Priority) -> Self {
        match Self::try_new(name, scope, threshold, priority) {
            Ok(constraint) => constraint,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<P: Payload> Constraint<P> for PreferValues {
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
        let mut shortfall = 0.0;
        let mut affected = Vec::new();
        for var in &self.scope {
            if let Some(value) = assignment.get(var) {
                if value.preference() < self.threshold {
                    shortfall += self.threshold - value.preference();
                    affected.push(var.id().to_string());
                }
            }
        }
        if affected.is_empty() {
            ConstraintResult::satisfied()
        } else {
            ConstraintResult::violated_with(
                format!("{}: {} value(s) below preference {}", self.name, affected.len(), self.threshold),
                shortfall,
                affected,
            )
        }
    }
}

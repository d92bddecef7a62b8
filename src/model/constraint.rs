//! The constraint capability.

use super::assignment::Assignment;
use super::value::{Payload, Value};
use super::variable::Variable;
use std::fmt;

/// How binding a constraint is.
///
/// `Hard` constraints must hold in every returned solution. The soft
/// levels are scored, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    /// Must be satisfied.
    Hard,
    /// Strong preference.
    High,
    /// Moderate preference.
    Medium,
    /// Weak preference.
    Low,
}

impl Priority {
    /// Numeric level, 1 (`Hard`) through 4 (`Low`).
    pub fn level(self) -> u8 {
        match self {
            Priority::Hard => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    pub fn is_hard(self) -> bool {
        self == Priority::Hard
    }

    pub fn is_soft(self) -> bool {
        !self.is_hard()
    }

    /// Whether `self` binds more strongly than `other`.
    pub fn is_higher_than(self, other: Priority) -> bool {
        self.level() < other.level()
    }

    /// Multiplier applied to soft violation scores. Zero for `Hard`.
    pub fn soft_weight(self) -> f64 {
        match self {
            Priority::Hard => 0.0,
            Priority::High => 3.0,
            Priority::Medium => 2.0,
            Priority::Low => 1.0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Hard => "HARD",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        };
        f.write_str(s)
    }
}

/// Outcome of evaluating one constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintResult {
    /// Whether the constraint holds.
    pub satisfied: bool,
    /// Human-readable explanation.
    pub message: String,
    /// Non-negative violation score; 0 when satisfied.
    pub score: f64,
    /// Identifiers of the entities implicated by a violation.
    pub affected: Vec<String>,
}

impl ConstraintResult {
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            message: "Constraint satisfied".into(),
            score: 0.0,
            affected: Vec::new(),
        }
    }

    /// A violation with score 1.
    pub fn violated(message: impl Into<String>) -> Self {
        Self::violated_with(message, 1.0, Vec::new())
    }

    /// A violation with an explicit score and implicated entities.
    ///
    /// Negative scores are clamped to zero.
    pub fn violated_with(message: impl Into<String>, score: f64, affected: Vec<String>) -> Self {
        Self {
            satisfied: false,
            message: message.into(),
            score: score.max(0.0),
            affected,
        }
    }

    pub fn is_violated(&self) -> bool {
        !self.satisfied
    }

    pub fn with_affected_entity(mut self, entity: impl Into<String>) -> Self {
        self.affected.push(entity.into());
        self
    }

    /// Raises the score to `score` if it is higher than the current one.
    pub fn with_higher_score(mut self, score: f64) -> Self {
        self.score = self.score.max(score);
        self
    }
}

impl fmt::Display for ConstraintResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.satisfied { "SATISFIED" } else { "VIOLATED" };
        write!(f, "ConstraintResult[{state}:{}:{:.2}]", self.message, self.score)
    }
}

/// A rule over a subset (the scope) of the variables.
///
/// Concrete kinds are supplied by the embedding application or picked from
/// [`crate::constraints`]. The engine only ever talks to this trait.
///
/// # Contract
///
/// - `validate` inspects only the variables in `scope()`. The engine calls
///   it once every scope variable is assigned; it must not panic when some
///   are missing, and should report satisfied in that case.
/// - An empty scope marks a global constraint. It is evaluated on every
///   consistency check.
/// - `prune` must return a subsequence of `domain`. Values it drops are
///   ones this constraint rejects on its own, given `assignment`.
///
/// # Examples
///
/// ```
/// use u_csp::model::{Assignment, Constraint, ConstraintResult, Priority, Value, Variable};
///
/// struct NotA { scope: Vec<Variable> }
///
/// impl Constraint for NotA {
///     fn name(&self) -> &str { "not-a" }
///     fn priority(&self) -> Priority { Priority::Hard }
///     fn scope(&self) -> &[Variable] { &self.scope }
///     fn validate(&self, a: &Assignment) -> ConstraintResult {
///         match a.get(&self.scope[0]) {
///             Some(v) if v.id() == "A" => ConstraintResult::violated("A is forbidden"),
///             _ => ConstraintResult::satisfied(),
///         }
///     }
/// }
///
/// let x = Variable::named("x");
/// let c = NotA { scope: vec![x.clone()] };
/// let kept = c.prune(&Assignment::new(), &x, &[Value::named("A"), Value::named("B")]);
/// assert_eq!(kept, vec![Value::named("B")]);
/// ```
pub trait Constraint<P: Payload = ()>: Send + Sync {
    /// Name, unique within a problem. Used in diagnostics and fingerprints.
    fn name(&self) -> &str;

    fn priority(&self) -> Priority;

    /// Variables whose joint assignment this constraint inspects.
    fn scope(&self) -> &[Variable];

    /// Evaluates the constraint against `assignment`.
    fn validate(&self, assignment: &Assignment<P>) -> ConstraintResult;

    /// Removes values of `variable` this constraint rejects in isolation.
    ///
    /// The default tries each value on a copy of `assignment` and keeps it
    /// unless the constraint's whole scope is then assigned and the result
    /// is a violation. Unary constraints therefore prune fully; wider ones
    /// prune only once their other variables are fixed.
    fn prune(
        &self,
        assignment: &Assignment<P>,
        variable: &Variable,
        domain: &[Value<P>],
    ) -> Vec<Value<P>> {
        let mut trial = assignment.clone();
        domain
            .iter()
            .filter(|value| {
                trial.assign(variable.clone(), (*value).clone());
                self.scope().iter().any(|v| !trial.is_assigned(v))
                    || self.validate(&trial).satisfied
            })
            .cloned()
            .collect()
    }

    fn is_hard(&self) -> bool {
        self.priority().is_hard()
    }
}

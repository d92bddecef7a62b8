//! Consistency evaluation.
//!
//! An assignment is consistent when no hard constraint whose scope is
//! fully assigned is violated. Constraints with unassigned scope variables
//! are deferred, and soft constraints never make an assignment
//! inconsistent.

use crate::model::{Assignment, ConstraintResult, CspProblem, Payload};

/// Whether constraint `c` is hard, decidable and violated.
pub(crate) fn violates<P: Payload>(problem: &CspProblem<P>, assignment: &Assignment<P>, c: usize) -> bool {
    let constraint = &problem.constraints()[c];
    constraint.is_hard()
        && problem.is_decidable(c, assignment)
        && !constraint.validate(assignment).satisfied
}

/// Consistency of `assignment` after `var` was assigned, assuming it was
/// consistent before.
///
/// Only constraints touching `var` can have changed verdict, plus global
/// constraints, which see the whole assignment.
pub(crate) fn is_consistent_after<P: Payload>(
    problem: &CspProblem<P>,
    assignment: &Assignment<P>,
    var: usize,
) -> bool {
    problem
        .constraints_of(var)
        .iter()
        .chain(problem.global_constraints())
        .all(|&c| !violates(problem, assignment, c))
}

/// Consistency of `assignment` from scratch.
pub(crate) fn is_consistent<P: Payload>(problem: &CspProblem<P>, assignment: &Assignment<P>) -> bool {
    (0..problem.constraint_count()).all(|c| !violates(problem, assignment, c))
}

/// Weight of a violated hard constraint in a conflict count.
///
/// A violation reporting score 0 still counts as 1, so that a zero
/// conflict count always means no hard violation.
pub(crate) fn conflict_weight(result: &ConstraintResult) -> f64 {
    if result.satisfied {
        0.0
    } else if result.score > 0.0 {
        result.score
    } else {
        1.0
    }
}

fn conflicts_of<P: Payload>(problem: &CspProblem<P>, assignment: &Assignment<P>, c: usize) -> f64 {
    let constraint = &problem.constraints()[c];
    if !constraint.is_hard() || !problem.is_decidable(c, assignment) {
        return 0.0;
    }
    conflict_weight(&constraint.validate(assignment))
}

/// Sum of hard violation weights over every decidable constraint.
pub(crate) fn total_conflicts<P: Payload>(problem: &CspProblem<P>, assignment: &Assignment<P>) -> f64 {
    (0..problem.constraint_count())
        .map(|c| conflicts_of(problem, assignment, c))
        .sum()
}

/// Hard violation weight of the constraints touching `var`, plus globals.
///
/// Changing only `var` changes the total by exactly the change in this
/// quantity.
pub(crate) fn local_conflicts<P: Payload>(
    problem: &CspProblem<P>,
    assignment: &Assignment<P>,
    var: usize,
) -> f64 {
    problem
        .constraints_of(var)
        .iter()
        .chain(problem.global_constraints())
        .map(|&c| conflicts_of(problem, assignment, c))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{AllDifferent, PreferValues, Predicate};
    use crate::model::{Priority, Value, Variable};

    fn problem() -> CspProblem {
        let (x, y, z) = (Variable::named("x"), Variable::named("y"), Variable::named("z"));
        let ab = || [Value::named("A"), Value::named("B")];
        CspProblem::builder()
            .variable(x.clone(), ab())
            .variable(y.clone(), ab())
            .variable(z.clone(), ab())
            .constraint(AllDifferent::new("xy", vec![x.clone(), y.clone()]))
            .constraint(PreferValues::new("soft", vec![z], 5.0, Priority::High))
            .build()
            .unwrap()
    }

    #[test]
    fn test_partial_scope_is_deferred() {
        let p = problem();
        let mut a = Assignment::new();
        a.assign(p.variables()[0].clone(), Value::named("A"));
        assert!(is_consistent_after(&p, &a, 0));
        assert!(is_consistent(&p, &a));
    }

    #[test]
    fn test_hard_violation_is_inconsistent() {
        let p = problem();
        let mut a = Assignment::new();
        a.assign(p.variables()[0].clone(), Value::named("A"));
        a.assign(p.variables()[1].clone(), Value::named("A"));
        assert!(!is_consistent_after(&p, &a, 1));
        assert_eq!(total_conflicts(&p, &a), 1.0);
        assert_eq!(local_conflicts(&p, &a, 2), 0.0);
    }

    #[test]
    fn test_soft_violation_never_blocks() {
        let p = problem();
        let mut a = Assignment::new();
        a.assign(p.variables()[2].clone(), Value::named("A"));
        assert!(is_consistent_after(&p, &a, 2));
        assert_eq!(total_conflicts(&p, &a), 0.0);
    }

    #[test]
    fn test_global_constraint_always_checked() {
        let x = Variable::named("x");
        let p = CspProblem::builder()
            .variable(x.clone(), [Value::named("A")])
            .constraint(Predicate::new("never", vec![], |_: &[&Value]| false))
            .build()
            .unwrap();
        let mut a = Assignment::new();
        assert!(!is_consistent(&p, &a));
        a.assign(x, Value::named("A"));
        assert!(!is_consistent_after(&p, &a, 0));
    }

    #[test]
    fn test_zero_score_violation_weighs_one() {
        let r = ConstraintResult::violated_with("x", 0.0, vec![]);
        assert_eq!(conflict_weight(&r), 1.0);
        assert_eq!(conflict_weight(&ConstraintResult::satisfied()), 0.0);
    }
}

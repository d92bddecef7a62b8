//! Domain reduction before decomposition.

use crate::model::{Assignment, CspProblem, Payload, Value};
use std::collections::HashMap;

/// Reduced domains of `problem`, parallel to its variables.
///
/// Each hard constraint whose scope contains a variable prunes that
/// variable's domain against the empty assignment, i.e. removes values
/// the constraint rejects in isolation. The survivors keep their original
/// order. Soft constraints never remove values.
///
/// Reduction is a fixed point: reducing already reduced domains changes
/// nothing, provided each constraint judges values independently of the
/// rest of the domain it is given.
pub fn reduce_domains<P: Payload>(problem: &CspProblem<P>) -> Vec<Vec<Value<P>>> {
    let empty = Assignment::new();
    (0..problem.variable_count())
        .map(|var| {
            let variable = &problem.variables()[var];
            let mut domain = problem.domain(var).to_vec();
            for &c in problem.constraints_of(var) {
                if domain.is_empty() {
                    break;
                }
                let constraint = &problem.constraints()[c];
                if !constraint.is_hard() {
                    continue;
                }
                let kept = constraint.prune(&empty, variable, &domain);
                let mut by_id: HashMap<&str, Vec<&Value<P>>> = HashMap::with_capacity(kept.len());
                for value in &kept {
                    by_id.entry(value.id()).or_default().push(value);
                }
                domain.retain(|value| {
                    by_id
                        .get(value.id())
                        .is_some_and(|same_id| same_id.iter().any(|&k| k == value))
                });
            }
            domain
        })
        .collect()
}

/// Number of values removed going from `before` to `after`.
pub(crate) fn removed_count<P: Payload>(before: &[Vec<Value<P>>], after: &[Vec<Value<P>>]) -> usize {
    before
        .iter()
        .zip(after)
        .map(|(b, a)| b.len().saturating_sub(a.len()))
        .sum()
}

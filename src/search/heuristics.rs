//! Variable and value ordering.

use super::config::ValueOrder;
use super::domains::DomainSnapshot;
use crate::model::{Assignment, CspProblem, Payload};

/// Minimum Remaining Values: the unassigned variable with the smallest
/// remaining domain, ties broken by declaration order.
///
/// Returns `None` when every variable is assigned.
pub(crate) fn select_mrv<P: Payload>(
    problem: &CspProblem<P>,
    assignment: &Assignment<P>,
    domains: &DomainSnapshot,
) -> Option<usize> {
    (0..problem.variable_count())
        .filter(|&v| !assignment.is_assigned(&problem.variables()[v]))
        .min_by_key(|&v| domains.len(v))
}

/// Least Constraining Value ordering of the remaining values of `var`.
///
/// The cost of a value is the number of unassigned variables sharing a
/// constraint with `var`. It does not simulate pruning, so every value of
/// one variable gets the same cost and the sort is stable; with
/// [`ValueOrder::Preference`] higher preference scores come first among
/// equal costs.
///
/// Returns positions into the original domain.
pub(crate) fn order_values<P: Payload>(
    problem: &CspProblem<P>,
    assignment: &Assignment<P>,
    domains: &DomainSnapshot,
    var: usize,
    order: ValueOrder,
) -> Vec<usize> {
    let domain = problem.domain(var);
    let mut ranked: Vec<(usize, usize)> = domains
        .positions(var)
        .iter()
        .map(|&pos| (pos, constraining_cost(problem, assignment, var)))
        .collect();

    match order {
        ValueOrder::DomainOrder => ranked.sort_by_key(|&(_, cost)| cost),
        ValueOrder::Preference => ranked.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| domain[b.0].preference().total_cmp(&domain[a.0].preference()))
        }),
    }
    ranked.into_iter().map(|(pos, _)| pos).collect()
}

fn constraining_cost<P: Payload>(problem: &CspProblem<P>, assignment: &Assignment<P>, var: usize) -> usize {
    problem
        .neighbors(var)
        .iter()
        .filter(|&&n| !assignment.is_assigned(&problem.variables()[n]))
        .count()
}

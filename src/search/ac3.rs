//! AC-3 arc consistency.

use super::domains::DomainSnapshot;
use crate::model::{Assignment, CspProblem, Payload, Variable};
use std::collections::{HashSet, VecDeque};

/// Makes every arc of `problem` consistent with respect to `assignment`.
///
/// Arcs are the ordered pairs of distinct variables within each constraint
/// scope. A value `x` of `xi` survives arc `(xi, xj)` when some remaining
/// value `y` of `xj` leaves every hard constraint touching `xi` or `xj`
/// satisfied in the trial assignment `assignment + {xi: x, xj: y}`.
/// Constraints that are still undecidable in that trial are deferred.
///
/// Assigned variables must already be fixed to their value in `domains`.
/// Returns `false` on a domain wipeout.
pub(crate) fn enforce<P: Payload>(
    problem: &CspProblem<P>,
    assignment: &Assignment<P>,
    domains: &mut DomainSnapshot,
) -> bool {
    let mut queued: HashSet<(usize, usize)> = HashSet::new();
    let mut queue = VecDeque::new();
    for c in 0..problem.constraint_count() {
        let scope = problem.scope_of(c);
        for &xi in scope {
            for &xj in scope {
                if xi != xj && queued.insert((xi, xj)) {
                    queue.push_back((xi, xj));
                }
            }
        }
    }

    let mut trial = assignment.clone();
    while let Some((xi, xj)) = queue.pop_front() {
        queued.remove(&(xi, xj));
        if !revise(problem, assignment, &mut trial, domains, xi, xj) {
            continue;
        }
        if domains.is_empty(xi) {
            tracing::trace!(variable = problem.variables()[xi].id(), "ac3 wipeout");
            return false;
        }
        for &xk in problem.neighbors(xi) {
            if xk != xj && queued.insert((xk, xi)) {
                queue.push_back((xk, xi));
            }
        }
    }
    true
}

/// Removes the values of `xi` without support in `xj`. Returns whether
/// the domain of `xi` changed.
fn revise<P: Payload>(
    problem: &CspProblem<P>,
    base: &Assignment<P>,
    trial: &mut Assignment<P>,
    domains: &mut DomainSnapshot,
    xi: usize,
    xj: usize,
) -> bool {
    let vi = &problem.variables()[xi];
    let vj = &problem.variables()[xj];
    let checks: Vec<usize> = problem
        .constraints_of(xi)
        .iter()
        .copied()
        .chain(
            problem
                .constraints_of(xj)
                .iter()
                .copied()
                .filter(|&c| !problem.scope_of(c).contains(&xi)),
        )
        .chain(problem.global_constraints().iter().copied())
        .filter(|&c| problem.constraints()[c].is_hard())
        .collect();

    let support: Vec<usize> = domains.positions(xj).to_vec();
    let changed = domains.retain(xi, |x| {
        trial.assign(vi.clone(), problem.domain(xi)[x].clone());
        support.iter().any(|&y| {
            trial.assign(vj.clone(), problem.domain(xj)[y].clone());
            checks.iter().all(|&c| {
                !problem.is_decidable(c, trial) || problem.constraints()[c].validate(trial).satisfied
            })
        })
    });

    restore(trial, base, vi);
    restore(trial, base, vj);
    changed
}

fn restore<P: Payload>(trial: &mut Assignment<P>, base: &Assignment<P>, var: &Variable) {
    match base.get(var) {
        Some(value) => trial.assign(var.clone(), value.clone()),
        None => {
            trial.unassign(var);
        }
    }
}

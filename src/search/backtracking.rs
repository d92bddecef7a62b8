//! Depth-first backtracking with MRV/LCV ordering.
//!
//! The search runs on an explicit stack of frames instead of recursion, so
//! deep instances cannot overflow the call stack. Every frame owns its
//! assignment and a copy-on-write [`DomainSnapshot`]; sibling branches
//! never observe each other's pruning.
//!
//! Two propagation modes share the loop:
//!
//! - **forward checking**: after a consistent assignment, values of
//!   unassigned neighbours that violate a shared hard constraint are removed;
//!   an emptied domain abandons the branch immediately.
//! - **AC-3**: arc consistency is enforced on entry to every node, over the
//!   domains inherited from the parent; value checks during the node are
//!   plain consistency tests.

use super::ac3;
use super::config::{SearchConfig, Strategy};
use super::consistency::{is_consistent, is_consistent_after, violates};
use super::domains::DomainSnapshot;
use super::heuristics::{order_values, select_mrv};
use super::runner::{Budget, Outcome, SearchStats};
use crate::model::{Assignment, CspProblem, Payload};

struct Frame<P: Payload> {
    assignment: Assignment<P>,
    domains: DomainSnapshot,
    var: usize,
    candidates: Vec<usize>,
    next: usize,
}

enum Node<P: Payload> {
    Complete(Assignment<P>),
    DeadEnd,
    Open(Frame<P>),
}

pub(crate) fn solve<P: Payload>(
    problem: &CspProblem<P>,
    config: &SearchConfig,
    budget: &Budget,
    stats: &mut SearchStats,
) -> Outcome<P> {
    let use_ac3 = config.strategy == Strategy::Ac3;

    if let Some(status) = budget.interrupted() {
        return Outcome::Interrupted(status);
    }
    let root = Assignment::new();
    if !is_consistent(problem, &root) {
        return Outcome::Exhausted;
    }

    let mut stack = match enter(problem, config, use_ac3, root, DomainSnapshot::full(problem), stats) {
        Node::Complete(solution) => return Outcome::Found(solution),
        Node::DeadEnd => return Outcome::Exhausted,
        Node::Open(frame) => vec![frame],
    };

    while let Some(frame) = stack.last_mut() {
        if let Some(status) = budget.interrupted() {
            return Outcome::Interrupted(status);
        }

        let Some(&pos) = frame.candidates.get(frame.next) else {
            stack.pop();
            if !stack.is_empty() {
                stats.backtracks += 1;
            }
            continue;
        };
        frame.next += 1;

        let var = frame.var;
        let variable = problem.variables()[var].clone();
        frame.assignment.assign(variable.clone(), problem.domain(var)[pos].clone());
        let child = is_consistent_after(problem, &frame.assignment, var).then(|| frame.assignment.clone());
        frame.assignment.unassign(&variable);
        let Some(mut assignment) = child else {
            continue;
        };

        let mut domains = frame.domains.clone();
        domains.fix(var, pos);
        if !use_ac3 && !forward_check(problem, &mut assignment, &mut domains, var) {
            stats.backtracks += 1;
            continue;
        }

        match enter(problem, config, use_ac3, assignment, domains, stats) {
            Node::Complete(solution) => return Outcome::Found(solution),
            Node::DeadEnd => stats.backtracks += 1,
            Node::Open(child) => stack.push(child),
        }
    }
    Outcome::Exhausted
}

fn enter<P: Payload>(
    problem: &CspProblem<P>,
    config: &SearchConfig,
    use_ac3: bool,
    assignment: Assignment<P>,
    mut domains: DomainSnapshot,
    stats: &mut SearchStats,
) -> Node<P> {
    stats.nodes_explored += 1;

    if assignment.len() == problem.variable_count() {
        return Node::Complete(assignment);
    }
    if use_ac3 && !ac3::enforce(problem, &assignment, &mut domains) {
        return Node::DeadEnd;
    }
    let Some(var) = select_mrv(problem, &assignment, &domains) else {
        return Node::DeadEnd;
    };
    let candidates = order_values(problem, &assignment, &domains, var, config.value_order);
    Node::Open(Frame {
        assignment,
        domains,
        var,
        candidates,
        next: 0,
    })
}

/// Prunes the unassigned neighbours of `var` against the shared hard
/// constraints. Returns `false` on a domain wipeout.
fn forward_check<P: Payload>(
    problem: &CspProblem<P>,
    assignment: &mut Assignment<P>,
    domains: &mut DomainSnapshot,
    var: usize,
) -> bool {
    for &u in problem.neighbors(var) {
        let neighbor = &problem.variables()[u];
        if assignment.is_assigned(neighbor) {
            continue;
        }
        let shared: Vec<usize> = problem
            .shared_constraints(var, u)
            .filter(|&c| problem.constraints()[c].is_hard())
            .collect();
        if shared.is_empty() {
            continue;
        }

        domains.retain(u, |pos| {
            assignment.assign(neighbor.clone(), problem.domain(u)[pos].clone());
            shared.iter().all(|&c| !violates(problem, assignment, c))
        });
        assignment.unassign(neighbor);

        if domains.is_empty(u) {
            tracing::trace!(
                assigned = problem.variables()[var].id(),
                wiped = neighbor.id(),
                "forward checking wipeout"
            );
            return false;
        }
    }
    true
}

//! Splitting a problem into independent subproblems.

use crate::error::CspResult;
use crate::model::{CspProblem, Payload, Value};

/// Union-find over variable positions, with path halving and union by
/// size.
#[derive(Debug, Clone)]
pub(crate) struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Groups of variables connected through constraint scopes.
///
/// Two variables share a group when a chain of constraints links them.
/// Groups are listed by their first variable, and each group keeps
/// declaration order. A global (empty-scope) constraint links every
/// variable, producing a single group.
pub fn connected_groups<P: Payload>(problem: &CspProblem<P>) -> Vec<Vec<usize>> {
    let n = problem.variable_count();
    if n == 0 {
        return Vec::new();
    }
    if !problem.global_constraints().is_empty() {
        return vec![(0..n).collect()];
    }

    let mut sets = DisjointSets::new(n);
    for c in 0..problem.constraint_count() {
        if let Some((&first, rest)) = problem.scope_of(c).split_first() {
            for &v in rest {
                sets.union(first, v);
            }
        }
    }

    let mut group_of_root = vec![usize::MAX; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for v in 0..n {
        let root = sets.find(v);
        if group_of_root[root] == usize::MAX {
            group_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[group_of_root[root]].push(v);
    }
    groups
}

/// One subproblem per connected group, over `domains` (parallel to the
/// problem's variables).
///
/// Subproblems are variable-disjoint; each carries the constraints scoped
/// to its variables.
pub fn decompose<P: Payload>(
    problem: &CspProblem<P>,
    domains: &[Vec<Value<P>>],
) -> CspResult<Vec<CspProblem<P>>> {
    connected_groups(problem)
        .iter()
        .map(|group| problem.subproblem(group, domains))
        .collect()
}

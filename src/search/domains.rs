//! Branch-local domain snapshots.
//!
//! A snapshot stores, per variable, the positions of the values still
//! available in the problem's original domain. Each variable's list sits
//! behind an `Arc`, so cloning a snapshot for a child branch copies only
//! pointers; a list is duplicated the first time the child narrows it.

use crate::model::{CspProblem, Payload, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub(crate) struct DomainSnapshot {
    lists: Vec<Arc<Vec<usize>>>,
}

impl DomainSnapshot {
    /// Every value of every domain.
    pub(crate) fn full<P: Payload>(problem: &CspProblem<P>) -> Self {
        Self {
            lists: problem
                .domains()
                .iter()
                .map(|d| Arc::new((0..d.len()).collect()))
                .collect(),
        }
    }

    pub(crate) fn len(&self, var: usize) -> usize {
        self.lists[var].len()
    }

    pub(crate) fn is_empty(&self, var: usize) -> bool {
        self.lists[var].is_empty()
    }

    /// Positions of the remaining values of `var`.
    pub(crate) fn positions(&self, var: usize) -> &[usize] {
        &self.lists[var]
    }

    /// Resolves the remaining values of `var` against the problem.
    pub(crate) fn values<'a, P: Payload>(
        &'a self,
        problem: &'a CspProblem<P>,
        var: usize,
    ) -> impl Iterator<Item = &'a Value<P>> + 'a {
        let domain = problem.domain(var);
        self.lists[var].iter().map(move |&i| &domain[i])
    }

    /// Narrows `var` to the single position `pos`.
    pub(crate) fn fix(&mut self, var: usize, pos: usize) {
        self.lists[var] = Arc::new(vec![pos]);
    }

    /// Keeps the positions of `var` satisfying `keep`. Returns whether
    /// anything was removed.
    pub(crate) fn retain(&mut self, var: usize, mut keep: impl FnMut(usize) -> bool) -> bool {
        let before = self.lists[var].len();
        let kept: Vec<usize> = self.lists[var].iter().copied().filter(|&p| keep(p)).collect();
        if kept.len() == before {
            return false;
        }
        self.lists[var] = Arc::new(kept);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variable;

    fn problem() -> CspProblem {
        CspProblem::builder()
            .variable(Variable::named("x"), [Value::named("A"), Value::named("B"), Value::named("C")])
            .variable(Variable::named("y"), [Value::named("A")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_child_changes_do_not_leak() {
        let p = problem();
        let parent = DomainSnapshot::full(&p);
        let mut child = parent.clone();

        assert!(child.retain(0, |pos| pos != 1));
        child.fix(1, 0);

        assert_eq!(parent.positions(0), &[0, 1, 2]);
        assert_eq!(child.positions(0), &[0, 2]);
        let ids: Vec<&str> = child.values(&p, 0).map(|v| v.id()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn test_retain_reports_change() {
        let p = problem();
        let mut s = DomainSnapshot::full(&p);
        assert!(!s.retain(1, |_| true));
        assert!(s.retain(1, |_| false));
        assert!(s.is_empty(1));
        assert_eq!(s.len(0), 3);
    }
}

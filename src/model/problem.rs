//! CSP instances.

use super::assignment::Assignment;
use super::constraint::{Constraint, ConstraintResult, Priority};
use super::value::{Payload, Value};
use super::variable::Variable;
use crate::error::{CspError, CspResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A constraint shared between a problem and the subproblems cut from it.
pub type SharedConstraint<P> = Arc<dyn Constraint<P>>;

/// A constraint satisfaction problem: variables, their domains and the
/// constraints over them.
///
/// Variable order is the order of declaration and is the tie-breaking
/// order used by every heuristic. Scopes are resolved to indices when the
/// problem is built, so a scope naming an undeclared variable is rejected
/// before any search begins.
///
/// # Examples
///
/// ```
/// use u_csp::constraints::AllDifferent;
/// use u_csp::model::{CspProblem, Value, Variable};
///
/// let x = Variable::named("x");
/// let y = Variable::named("y");
/// let problem = CspProblem::builder()
///     .variable(x.clone(), [Value::named("A"), Value::named("B")])
///     .variable(y.clone(), [Value::named("A")])
///     .constraint(AllDifferent::new("x != y", vec![x, y]))
///     .build()
///     .unwrap();
/// assert_eq!(problem.variable_count(), 2);
/// assert_eq!(problem.constraint_count(), 1);
/// ```
pub struct CspProblem<P: Payload = ()> {
    variables: Vec<Variable>,
    index: HashMap<Variable, usize>,
    domains: Vec<Vec<Value<P>>>,
    constraints: Vec<SharedConstraint<P>>,
    scopes: Vec<Vec<usize>>,
    by_variable: Vec<Vec<usize>>,
    neighbors: Vec<Vec<usize>>,
    globals: Vec<usize>,
}

/// Builder for [`CspProblem`].
pub struct CspProblemBuilder<P: Payload = ()> {
    variables: Vec<(Variable, Vec<Value<P>>)>,
    constraints: Vec<SharedConstraint<P>>,
}

impl<P: Payload> CspProblemBuilder<P> {
    /// Declares a variable with its initial domain, in caller order.
    pub fn variable(mut self, variable: Variable, domain: impl IntoIterator<Item = Value<P>>) -> Self {
        self.variables.push((variable, domain.into_iter().collect()));
        self
    }

    /// Adds a constraint.
    pub fn constraint<C: Constraint<P> + 'static>(self, constraint: C) -> Self {
        self.shared_constraint(Arc::new(constraint))
    }

    /// Adds an already shared constraint.
    pub fn shared_constraint(mut self, constraint: SharedConstraint<P>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Validates the structure and builds the problem.
    pub fn build(self) -> CspResult<CspProblem<P>> {
        let (variables, domains) = self.variables.into_iter().unzip();
        CspProblem::from_parts(variables, domains, self.constraints)
    }
}

impl<P: Payload> CspProblem<P> {
    pub fn builder() -> CspProblemBuilder<P> {
        CspProblemBuilder {
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Builds a problem from parallel vectors of variables and domains.
    ///
    /// # Errors
    ///
    /// [`CspError::DomainCountMismatch`] if the two vectors differ in length,
    /// [`CspError::DuplicateVariable`] if two variables share an id,
    /// [`CspError::UnknownVariable`] if a scope names an undeclared variable.
    pub fn from_parts(
        variables: Vec<Variable>,
        domains: Vec<Vec<Value<P>>>,
        constraints: Vec<SharedConstraint<P>>,
    ) -> CspResult<Self> {
        if variables.len() != domains.len() {
            return Err(CspError::DomainCountMismatch {
                variables: variables.len(),
                domains: domains.len(),
            });
        }

        let mut index = HashMap::with_capacity(variables.len());
        for (i, var) in variables.iter().enumerate() {
            if index.insert(var.clone(), i).is_some() {
                return Err(CspError::DuplicateVariable(var.id().to_string()));
            }
        }

        let mut scopes = Vec::with_capacity(constraints.len());
        let mut by_variable = vec![Vec::new(); variables.len()];
        let mut globals = Vec::new();
        for (ci, constraint) in constraints.iter().enumerate() {
            let mut scope = Vec::with_capacity(constraint.scope().len());
            for var in constraint.scope() {
                let vi = *index.get(var).ok_or_else(|| CspError::UnknownVariable {
                    constraint: constraint.name().to_string(),
                    variable: var.id().to_string(),
                })?;
                if !scope.contains(&vi) {
                    scope.push(vi);
                    by_variable[vi].push(ci);
                }
            }
            if scope.is_empty() {
                globals.push(ci);
            }
            scopes.push(scope);
        }

        let mut neighbors = vec![Vec::new(); variables.len()];
        for scope in &scopes {
            for &a in scope {
                for &b in scope {
                    if a != b {
                        neighbors[a].push(b);
                    }
                }
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self {
            variables,
            index,
            domains,
            constraints,
            scopes,
            by_variable,
            neighbors,
            globals,
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraints(&self) -> &[SharedConstraint<P>] {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Position of `variable` in declaration order.
    pub fn index_of(&self, variable: &Variable) -> Option<usize> {
        self.index.get(variable).copied()
    }

    /// Domain of the variable at position `var`.
    pub fn domain(&self, var: usize) -> &[Value<P>] {
        &self.domains[var]
    }

    pub fn domain_of(&self, variable: &Variable) -> Option<&[Value<P>]> {
        self.index_of(variable).map(|i| self.domain(i))
    }

    /// All domains, parallel to [`CspProblem::variables`].
    pub fn domains(&self) -> &[Vec<Value<P>>] {
        &self.domains
    }

    /// Mean domain size; 0 for an empty problem.
    pub fn average_domain_size(&self) -> f64 {
        if self.domains.is_empty() {
            return 0.0;
        }
        let total: usize = self.domains.iter().map(Vec::len).sum();
        total as f64 / self.domains.len() as f64
    }

    /// Scope of constraint `c` as variable positions.
    pub fn scope_of(&self, c: usize) -> &[usize] {
        &self.scopes[c]
    }

    /// Constraints whose scope contains variable `var`.
    pub fn constraints_of(&self, var: usize) -> &[usize] {
        &self.by_variable[var]
    }

    /// Variables sharing at least one constraint with `var`, ascending.
    pub fn neighbors(&self, var: usize) -> &[usize] {
        &self.neighbors[var]
    }

    /// Constraints with an empty scope.
    pub fn global_constraints(&self) -> &[usize] {
        &self.globals
    }

    /// Whether variables `a` and `b` share a constraint.
    pub fn shares_constraint(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    /// Constraints whose scope contains both `a` and `b`.
    pub fn shared_constraints(&self, a: usize, b: usize) -> impl Iterator<Item = usize> + '_ {
        self.by_variable[a]
            .iter()
            .copied()
            .filter(move |&c| self.scopes[c].contains(&b))
    }

    /// Whether every variable of constraint `c` is assigned.
    pub fn is_decidable(&self, c: usize, assignment: &Assignment<P>) -> bool {
        self.scopes[c]
            .iter()
            .all(|&v| assignment.is_assigned(&self.variables[v]))
    }

    /// Whether `assignment` covers every variable of the problem.
    pub fn is_complete(&self, assignment: &Assignment<P>) -> bool {
        assignment.is_complete(&self.variables)
    }

    /// Evaluates every decidable constraint against `assignment`.
    ///
    /// Constraints with unassigned scope variables are skipped; they are
    /// not yet decidable.
    pub fn evaluate(&self, assignment: &Assignment<P>) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for (ci, constraint) in self.constraints.iter().enumerate() {
            if !self.is_decidable(ci, assignment) {
                continue;
            }
            let result = constraint.validate(assignment);
            if result.satisfied {
                continue;
            }
            let priority = constraint.priority();
            if priority.is_hard() {
                evaluation.hard_violations += 1;
                evaluation.hard_score += result.score;
            } else {
                evaluation.soft_score += result.score * priority.soft_weight();
            }
            evaluation.violations.push(Violation {
                constraint: constraint.name().to_string(),
                priority,
                result,
            });
        }
        evaluation
    }

    /// Whether `assignment` is complete and violates no hard constraint.
    pub fn is_solution(&self, assignment: &Assignment<P>) -> bool {
        self.is_complete(assignment) && self.evaluate(assignment).is_feasible()
    }

    /// A copy of this problem with replaced domains, parallel to
    /// [`CspProblem::variables`].
    ///
    /// # Errors
    ///
    /// [`CspError::DomainCountMismatch`] if `domains` has the wrong length.
    pub fn with_domains(&self, domains: Vec<Vec<Value<P>>>) -> CspResult<Self> {
        self.check_domain_count(domains.len())?;
        Ok(self.replacing_domains(domains))
    }

    fn check_domain_count(&self, domains: usize) -> CspResult<()> {
        if domains == self.variables.len() {
            Ok(())
        } else {
            Err(CspError::DomainCountMismatch {
                variables: self.variables.len(),
                domains,
            })
        }
    }

    fn replacing_domains(&self, domains: Vec<Vec<Value<P>>>) -> Self {
        Self {
            variables: self.variables.clone(),
            index: self.index.clone(),
            domains,
            constraints: self.constraints.clone(),
            scopes: self.scopes.clone(),
            by_variable: self.by_variable.clone(),
            neighbors: self.neighbors.clone(),
            globals: self.globals.clone(),
        }
    }

    /// The sub-instance over `vars` (positions into this problem), using
    /// `domains` (parallel to `self.variables()`) and every constraint whose
    /// scope touches one of `vars`.
    ///
    /// Callers pass a set of variables closed under constraint scopes, so
    /// every kept constraint is fully scoped inside the subproblem.
    pub fn subproblem(&self, vars: &[usize], domains: &[Vec<Value<P>>]) -> CspResult<Self> {
        self.check_domain_count(domains.len())?;
        let mut member = vec![false; self.variables.len()];
        for &v in vars {
            member[v] = true;
        }
        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .filter(|(ci, _)| {
                self.scopes[*ci].is_empty() || self.scopes[*ci].iter().any(|&v| member[v])
            })
            .map(|(_, c)| Arc::clone(c))
            .collect();
        Self::from_parts(
            vars.iter().map(|&v| self.variables[v].clone()).collect(),
            vars.iter().map(|&v| domains[v].clone()).collect(),
            constraints,
        )
    }

    /// A copy with variables presented in `order` (a permutation of positions).
    pub fn reordered(&self, order: &[usize]) -> Self {
        debug_assert_eq!(order.len(), self.variables.len());
        let variables = order.iter().map(|&v| self.variables[v].clone()).collect();
        let domains = order.iter().map(|&v| self.domains[v].clone()).collect();
        // A permutation of an already validated problem cannot fail to build.
        match Self::from_parts(variables, domains, self.constraints.clone()) {
            Ok(problem) => problem,
            Err(_) => self.clone(),
        }
    }
}

impl<P: Payload> Clone for CspProblem<P> {
    fn clone(&self) -> Self {
        self.replacing_domains(self.domains.clone())
    }
}

impl<P: Payload> fmt::Debug for CspProblem<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CspProblem")
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("average_domain_size", &self.average_domain_size())
            .finish()
    }
}

/// One violated constraint, as reported by [`CspProblem::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub constraint: String,
    pub priority: Priority,
    pub result: ConstraintResult,
}

/// Diagnostics for an assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Every violated, decidable constraint.
    pub violations: Vec<Violation>,
    /// Number of violated hard constraints.
    pub hard_violations: usize,
    /// Sum of hard violation scores.
    pub hard_score: f64,
    /// Sum of soft violation scores weighted by priority.
    pub soft_score: f64,
}

impl Evaluation {
    /// No hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.hard_violations == 0
    }

    /// Identifiers of every entity implicated by a violation, deduplicated.
    pub fn affected_entities(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for v in &self.violations {
            for e in &v.result.affected {
                if !out.contains(&e.as_str()) {
                    out.push(e);
                }
            }
        }
        out
    }
}

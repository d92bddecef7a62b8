//! Static variable ordering for the standard path.
//!
//! Variables are ranked once, before search, by a weighted sum of rule
//! scores. The default rules favour small domains and variables in many
//! (hard) constraints:
//!
//! `priority = 1000 / |domain| + constraints + 10 × hard constraints`

use crate::model::{CspProblem, Payload};

/// A scoring rule over a problem's variables.
///
/// **Higher scores come first.** Rules receive a variable position and the
/// problem it belongs to.
pub trait OrderingRule<P: Payload>: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, var: usize, problem: &CspProblem<P>) -> f64;
}

/// `1000 / |domain|`; an empty domain scores infinity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainTightness;

impl<P: Payload> OrderingRule<P> for DomainTightness {
    fn name(&self) -> &str {
        "DomainTightness"
    }

    fn score(&self, var: usize, problem: &CspProblem<P>) -> f64 {
        1000.0 / problem.domain(var).len() as f64
    }
}

/// Number of constraints on the variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintDegree;

impl<P: Payload> OrderingRule<P> for ConstraintDegree {
    fn name(&self) -> &str {
        "ConstraintDegree"
    }

    fn score(&self, var: usize, problem: &CspProblem<P>) -> f64 {
        problem.constraints_of(var).len() as f64
    }
}

/// Number of hard constraints on the variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardDegree;

impl<P: Payload> OrderingRule<P> for HardDegree {
    fn name(&self) -> &str {
        "HardDegree"
    }

    fn score(&self, var: usize, problem: &CspProblem<P>) -> f64 {
        problem
            .constraints_of(var)
            .iter()
            .filter(|&&c| problem.constraints()[c].is_hard())
            .count() as f64
    }
}

/// Number of distinct other variables sharing a constraint with the
/// variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Degree;

impl<P: Payload> OrderingRule<P> for Degree {
    fn name(&self) -> &str {
        "Degree"
    }

    fn score(&self, var: usize, problem: &CspProblem<P>) -> f64 {
        problem.neighbors(var).len() as f64
    }
}

/// `degree / |domain|`, the inverse of dom/deg, so the variable with the
/// smallest domain per neighbour comes first.
///
/// An unconstrained variable scores 0; an empty domain scores infinity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainDegreeRatio;

impl<P: Payload> OrderingRule<P> for DomainDegreeRatio {
    fn name(&self) -> &str {
        "DomainDegreeRatio"
    }

    fn score(&self, var: usize, problem: &CspProblem<P>) -> f64 {
        let size = problem.domain(var).len();
        if size == 0 {
            return f64::INFINITY;
        }
        problem.neighbors(var).len() as f64 / size as f64
    }
}

struct WeightedRule<P: Payload> {
    rule: Box<dyn OrderingRule<P>>,
    weight: f64,
}

/// Weighted composition of [`OrderingRule`]s.
///
/// # Examples
///
/// ```
/// use u_csp::optim::{ConstraintDegree, VariableOrdering};
/// use u_csp::model::{CspProblem, Value, Variable};
///
/// let problem = CspProblem::builder()
///     .variable(Variable::named("x"), [Value::named("A")])
///     .build()
///     .unwrap();
/// let ordering = VariableOrdering::new().with_rule(ConstraintDegree);
/// assert_eq!(ordering.order(&problem), vec![0]);
/// ```
pub struct VariableOrdering<P: Payload = ()> {
    rules: Vec<WeightedRule<P>>,
}

impl<P: Payload> VariableOrdering<P> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Domain tightness, constraint degree and hard degree × 10.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(DomainTightness)
            .with_rule(ConstraintDegree)
            .with_weighted_rule(HardDegree, 10.0)
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: OrderingRule<P> + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    pub fn with_weighted_rule<R: OrderingRule<P> + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Box::new(rule),
            weight,
        });
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|wr| wr.rule.name()).collect()
    }

    /// Weighted priority of variable `var`.
    pub fn score(&self, var: usize, problem: &CspProblem<P>) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.score(var, problem) * wr.weight)
            .sum()
    }

    /// Variable positions, highest priority first; ties keep declaration
    /// order.
    pub fn order(&self, problem: &CspProblem<P>) -> Vec<usize> {
        let scores: Vec<f64> = (0..problem.variable_count())
            .map(|v| self.score(v, problem))
            .collect();
        let mut order: Vec<usize> = (0..problem.variable_count()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order
    }
}

impl<P: Payload> Default for VariableOrdering<P> {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{AllDifferent, PreferValues};
    use crate::model::{Priority, Value, Variable};

    fn values(n: usize) -> Vec<Value> {
        (0..n).map(|i| Value::named(format!("s{i}"))).collect()
    }

    #[test]
    fn test_standard_scores() {
        let (x, y, z) = (Variable::named("x"), Variable::named("y"), Variable::named("z"));
        let problem = CspProblem::builder()
            .variable(x.clone(), values(10))
            .variable(y.clone(), values(10))
            .variable(z.clone(), values(4))
            .constraint(AllDifferent::new("xy", vec![x.clone(), y.clone()]))
            .constraint(PreferValues::new("pref", vec![y.clone()], 1.0, Priority::Low))
            .build()
            .unwrap();

        let ordering = VariableOrdering::standard();
        assert_eq!(ordering.rule_names(), vec!["DomainTightness", "ConstraintDegree", "HardDegree"]);
        assert_eq!(ordering.score(0, &problem), 100.0 + 1.0 + 10.0);
        assert_eq!(ordering.score(1, &problem), 100.0 + 2.0 + 10.0);
        assert_eq!(ordering.score(2, &problem), 250.0);
        assert_eq!(ordering.order(&problem), vec![2, 1, 0]);
    }

    #[test]
    fn test_degree_rules() {
        // x-y, x-z twice over: x has two neighbours, y and z one each.
        let (x, y, z, w) = (
            Variable::named("x"),
            Variable::named("y"),
            Variable::named("z"),
            Variable::named("w"),
        );
        let problem = CspProblem::builder()
            .variable(x.clone(), values(8))
            .variable(y.clone(), values(2))
            .variable(z.clone(), values(4))
            .variable(w.clone(), Vec::new())
            .constraint(AllDifferent::new("xy", vec![x.clone(), y.clone()]))
            .constraint(AllDifferent::new("xz", vec![x.clone(), z.clone()]))
            .constraint(AllDifferent::new("xz again", vec![x, z]))
            .build()
            .unwrap();

        let degree = VariableOrdering::new().with_rule(Degree);
        assert_eq!(degree.score(0, &problem), 2.0);
        assert_eq!(degree.score(2, &problem), 1.0);
        assert_eq!(degree.order(&problem), vec![0, 1, 2, 3]);

        let ratio = VariableOrdering::new().with_rule(DomainDegreeRatio);
        assert_eq!(ratio.rule_names(), vec!["DomainDegreeRatio"]);
        assert_eq!(ratio.score(0, &problem), 0.25);
        assert_eq!(ratio.score(1, &problem), 0.5);
        assert_eq!(ratio.score(2, &problem), 0.25);
        assert_eq!(ratio.score(3, &problem), f64::INFINITY);
        assert_eq!(ratio.order(&problem), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_unconstrained_ratio_is_zero() {
        let problem = CspProblem::builder()
            .variable(Variable::named("a"), values(3))
            .build()
            .unwrap();
        assert_eq!(VariableOrdering::new().with_rule(DomainDegreeRatio).score(0, &problem), 0.0);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let problem = CspProblem::builder()
            .variable(Variable::named("a"), values(3))
            .variable(Variable::named("b"), values(3))
            .variable(Variable::named("c"), values(3))
            .build()
            .unwrap();
        assert_eq!(VariableOrdering::standard().order(&problem), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_domain_first() {
        let problem = CspProblem::builder()
            .variable(Variable::named("a"), values(1))
            .variable(Variable::named("b"), Vec::new())
            .build()
            .unwrap();
        assert_eq!(VariableOrdering::standard().order(&problem), vec![1, 0]);
    }

    #[test]
    fn test_no_rules_keeps_order() {
        let problem = CspProblem::builder()
            .variable(Variable::named("a"), values(5))
            .variable(Variable::named("b"), values(1))
            .build()
            .unwrap();
        assert_eq!(VariableOrdering::new().order(&problem), vec![0, 1]);
    }
}

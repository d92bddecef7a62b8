//! Min-conflicts local search.
//!
//! Starts from a uniformly random complete assignment and repeatedly moves
//! the first variable (declaration order) that has a strictly improving
//! value to its least-conflicting value. The search is incomplete: a stall
//! in a local optimum or an exhausted step budget ends the attempt, and
//! with `max_restarts > 0` a fresh random assignment is drawn.
//!
//! With [`Annealing`] configured, a stall instead triggers a random move
//! of a conflicted variable under Metropolis acceptance, and only the step
//! budget ends the attempt.

use super::config::{Annealing, SearchConfig};
use super::consistency::{is_consistent, local_conflicts};
use super::runner::{Budget, Outcome, SearchStats};
use crate::model::{Assignment, CspProblem, Payload};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPS: f64 = 1e-9;

enum Descent {
    Solved,
    Stuck,
    Interrupted(super::SolveStatus),
}

pub(crate) fn solve<P: Payload>(
    problem: &CspProblem<P>,
    config: &SearchConfig,
    budget: &Budget,
    stats: &mut SearchStats,
) -> Outcome<P> {
    if problem.domains().iter().any(Vec::is_empty) {
        return Outcome::Exhausted;
    }

    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
    let max_steps = config.step_multiplier.saturating_mul(problem.variable_count());

    let mut restarts = 0;
    loop {
        let mut current = random_assignment(problem, &mut rng);
        let attempt = Attempt {
            max_steps,
            annealing: config.annealing,
        };
        match descend(problem, &mut current, &attempt, &mut rng, budget, stats) {
            Descent::Solved => return Outcome::Found(current),
            Descent::Interrupted(status) => return Outcome::Interrupted(status),
            Descent::Stuck => {}
        }
        if restarts >= config.max_restarts {
            return Outcome::Exhausted;
        }
        restarts += 1;
        stats.backtracks += 1;
        tracing::trace!(restarts, "min-conflicts restart");
    }
}

fn random_assignment<P: Payload, R: Rng>(problem: &CspProblem<P>, rng: &mut R) -> Assignment<P> {
    problem
        .variables()
        .iter()
        .zip(problem.domains())
        .map(|(var, domain)| (var.clone(), domain[rng.random_range(0..domain.len())].clone()))
        .collect()
}

struct Attempt {
    max_steps: usize,
    annealing: Option<Annealing>,
}

fn descend<P: Payload, R: Rng>(
    problem: &CspProblem<P>,
    current: &mut Assignment<P>,
    attempt: &Attempt,
    rng: &mut R,
    budget: &Budget,
    stats: &mut SearchStats,
) -> Descent {
    let max_steps = attempt.max_steps;
    let mut temperature = attempt.annealing.map_or(0.0, |a| a.initial_temperature);
    let mut steps = 0;
    loop {
        if let Some(status) = budget.interrupted() {
            return Descent::Interrupted(status);
        }
        if is_consistent(problem, current) {
            return Descent::Solved;
        }
        if steps >= max_steps {
            return Descent::Stuck;
        }
        steps += 1;
        stats.nodes_explored += 1;

        if let Some((var, pos)) = improving_move(problem, current) {
            current.assign(problem.variables()[var].clone(), problem.domain(var)[pos].clone());
        } else if let Some(annealing) = attempt.annealing {
            if !random_walk(problem, current, temperature, rng) {
                tracing::trace!(steps, "min-conflicts stalled with no conflicted variable");
                return Descent::Stuck;
            }
            temperature *= annealing.cooling_rate;
        } else {
            tracing::trace!(steps, "min-conflicts stalled");
            return Descent::Stuck;
        }
    }
}

/// Moves a random conflicted variable to a random value of its domain,
/// keeping the move under Metropolis acceptance. Returns false when no
/// variable is in conflict (only scope-less constraints are violated).
fn random_walk<P: Payload, R: Rng>(
    problem: &CspProblem<P>,
    current: &mut Assignment<P>,
    temperature: f64,
    rng: &mut R,
) -> bool {
    let conflicted: Vec<usize> = (0..problem.variable_count())
        .filter(|&v| !problem.constraints_of(v).is_empty() && local_conflicts(problem, current, v) > EPS)
        .collect();
    if conflicted.is_empty() {
        return false;
    }

    let var = conflicted[rng.random_range(0..conflicted.len())];
    let variable = &problem.variables()[var];
    let domain = problem.domain(var);
    let Some(original) = current.get(variable).cloned() else {
        return false;
    };
    let before = local_conflicts(problem, current, var);
    current.assign(variable.clone(), domain[rng.random_range(0..domain.len())].clone());
    let delta = local_conflicts(problem, current, var) - before;

    if !metropolis(delta, temperature, rng.random::<f64>()) {
        current.assign(variable.clone(), original);
    }
    true
}

/// Always accept improvements; accept a worsening `delta` when
/// `draw < exp(-delta / temperature)`.
fn metropolis(delta: f64, temperature: f64, draw: f64) -> bool {
    if delta < 0.0 {
        true
    } else if temperature > 0.0 {
        draw < (-delta / temperature).exp()
    } else {
        false
    }
}

/// The first variable with a strictly improving alternative, and its
/// least-conflicting value (first minimum in domain order).
///
/// Conflicts are compared over the constraints touching the variable,
/// which change by exactly as much as the total.
fn improving_move<P: Payload>(problem: &CspProblem<P>, current: &mut Assignment<P>) -> Option<(usize, usize)> {
    for var in 0..problem.variable_count() {
        let variable = &problem.variables()[var];
        let original = current.get(variable)?.clone();
        let base = local_conflicts(problem, current, var);
        if base <= EPS {
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        for (pos, value) in problem.domain(var).iter().enumerate() {
            current.assign(variable.clone(), value.clone());
            let score = local_conflicts(problem, current, var);
            match best {
                Some((_, b)) if score >= b - EPS => {}
                _ => best = Some((pos, score)),
            }
        }
        current.assign(variable.clone(), original);

        if let Some((pos, score)) = best {
            if score < base - EPS {
                return Some((var, pos));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{AllDifferent, Predicate};
    use crate::model::{Value, Variable};
    use crate::search::{Annealing, SearchRunner, SolveStatus, Strategy};

    fn colouring() -> CspProblem {
        // A 5-cycle with three colours.
        let vars: Vec<Variable> = (0..5).map(|i| Variable::named(format!("n{i}"))).collect();
        let colours = || [Value::named("R"), Value::named("G"), Value::named("B")];
        let mut builder = CspProblem::builder();
        for v in &vars {
            builder = builder.variable(v.clone(), colours());
        }
        for i in 0..5 {
            let j = (i + 1) % 5;
            builder = builder.constraint(AllDifferent::new(
                format!("n{i}-n{j}"),
                vec![vars[i].clone(), vars[j].clone()],
            ));
        }
        builder.build().unwrap()
    }

    fn config(seed: u64) -> SearchConfig {
        SearchConfig::default()
            .with_strategy(Strategy::MinConflicts)
            .with_seed(seed)
            .with_max_restarts(20)
    }

    #[test]
    fn test_solves_colouring() {
        let problem = colouring();
        let result = SearchRunner::run(&problem, &config(7));
        assert_eq!(result.status, SolveStatus::Solved);
        assert!(problem.is_solution(result.assignment.as_ref().unwrap()));
    }

    #[test]
    fn test_same_seed_same_result() {
        let problem = colouring();
        let a = SearchRunner::run(&problem, &config(11));
        let b = SearchRunner::run(&problem, &config(11));
        assert_eq!(a.status, b.status);
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.stats.nodes_explored, b.stats.nodes_explored);
    }

    #[test]
    fn test_stall_restarts_then_gives_up() {
        let x = Variable::named("x");
        let problem = CspProblem::builder()
            .variable(x.clone(), [Value::named("A"), Value::named("B")])
            .constraint(Predicate::new("never", vec![x], |_: &[&Value]| false))
            .build()
            .unwrap();

        let config = SearchConfig::default()
            .with_strategy(Strategy::MinConflicts)
            .with_seed(1)
            .with_max_restarts(2);
        let result = SearchRunner::run(&problem, &config);
        assert_eq!(result.status, SolveStatus::NoSolution);
        assert_eq!(result.stats.backtracks, 2);
        assert_eq!(result.stats.nodes_explored, 3);
    }

    #[test]
    fn test_improving_move_picks_first_minimum() {
        let (x, y) = (Variable::named("x"), Variable::named("y"));
        let problem = CspProblem::builder()
            .variable(x.clone(), [Value::named("A"), Value::named("B"), Value::named("C")])
            .variable(y.clone(), [Value::named("A")])
            .constraint(AllDifferent::new("xy", vec![x.clone(), y.clone()]))
            .build()
            .unwrap();

        let mut a: Assignment = [(x.clone(), Value::named("A")), (y, Value::named("A"))].into_iter().collect();
        assert_eq!(improving_move(&problem, &mut a), Some((0, 1)));
        assert_eq!(a.get(&x), Some(&Value::named("A")));
    }

    #[test]
    fn test_metropolis_acceptance() {
        assert!(metropolis(-1.0, 0.0, 0.99));
        assert!(!metropolis(1.0, 0.0, 0.0));
        assert!(metropolis(0.0, 1.0, 0.99));
        // exp(-1) ~ 0.368
        assert!(metropolis(1.0, 1.0, 0.3));
        assert!(!metropolis(1.0, 1.0, 0.4));
        assert!(!metropolis(1000.0, 1.0, 1e-12));
    }

    #[test]
    fn test_annealing_runs_full_budget_on_stall() {
        let x = Variable::named("x");
        let problem = CspProblem::builder()
            .variable(x.clone(), [Value::named("A"), Value::named("B")])
            .constraint(Predicate::new("never", vec![x], |_: &[&Value]| false))
            .build()
            .unwrap();

        let config = SearchConfig::default()
            .with_strategy(Strategy::MinConflicts)
            .with_seed(1)
            .with_step_multiplier(40)
            .with_annealing(Annealing::default());
        let result = SearchRunner::run(&problem, &config);
        assert_eq!(result.status, SolveStatus::NoSolution);
        assert_eq!(result.stats.nodes_explored, 40);
        assert_eq!(result.stats.backtracks, 0);
    }

    #[test]
    fn test_annealing_solves_colouring_in_one_attempt() {
        let problem = colouring();
        let config = SearchConfig::default()
            .with_strategy(Strategy::MinConflicts)
            .with_seed(5)
            .with_annealing(Annealing::default());
        let result = SearchRunner::run(&problem, &config);
        assert_eq!(result.status, SolveStatus::Solved);
        assert!(problem.is_solution(result.assignment.as_ref().unwrap()));
        assert_eq!(result.stats.backtracks, 0);
    }

    #[test]
    fn test_annealing_is_deterministic_per_seed() {
        let problem = colouring();
        let config = SearchConfig::default()
            .with_strategy(Strategy::MinConflicts)
            .with_seed(21)
            .with_annealing(Annealing::new(5.0, 0.9));
        let a = SearchRunner::run(&problem, &config);
        let b = SearchRunner::run(&problem, &config);
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.stats.nodes_explored, b.stats.nodes_explored);
    }

    #[test]
    fn test_zero_step_budget_fails_unless_already_solved() {
        let problem = colouring();
        let config = SearchConfig::default()
            .with_strategy(Strategy::MinConflicts)
            .with_seed(3)
            .with_step_multiplier(0);
        let result = SearchRunner::run(&problem, &config);
        if result.status == SolveStatus::Solved {
            assert_eq!(result.stats.nodes_explored, 0);
        } else {
            assert_eq!(result.status, SolveStatus::NoSolution);
        }
    }
}

use u_csp::constraints::{AllDifferent, AllowedValues, Capacity, ForbiddenCombination, PreferValues, Predicate};
use u_csp::model::{CspProblem, Priority, Value, ValueKind, Variable, VariableKind};
use u_csp::optim::{Optimizer, OptimizerConfig, SolvePath};
use u_csp::search::{SearchConfig, SearchRunner, SolveStatus, Strategy};

const STRATEGIES: [Strategy; 3] = [Strategy::ForwardChecking, Strategy::Ac3, Strategy::MinConflicts];

fn config(strategy: Strategy) -> SearchConfig {
    SearchConfig::default()
        .with_strategy(strategy)
        .with_seed(2024)
        .with_max_restarts(10)
}

fn ab() -> [Value; 2] {
    [Value::named("A"), Value::named("B")]
}

#[test]
fn forbidden_pair_is_never_both_a() {
    let vars: Vec<Variable> = ["x", "y", "z"].into_iter().map(Variable::named).collect();
    let mut builder = CspProblem::builder();
    for v in &vars {
        builder = builder.variable(v.clone(), ab());
    }
    let problem = builder
        .constraint(ForbiddenCombination::new(
            "x and y not both A",
            vec![vars[0].clone(), vars[1].clone()],
            vec!["A", "A"],
        ))
        .build()
        .unwrap();

    for strategy in STRATEGIES {
        let result = SearchRunner::run(&problem, &config(strategy));
        assert_eq!(result.status, SolveStatus::Solved, "{strategy}");
        let a = result.assignment.unwrap();
        assert!(a.is_complete(&vars));
        let a_count = vars[..2]
            .iter()
            .filter(|v| a.get(v).map(|val| val.id()) == Some("A"))
            .count();
        assert!(a_count <= 1, "{strategy}");
    }
}

#[test]
fn empty_domain_means_no_solution() {
    let mut builder = CspProblem::builder();
    for i in 0..6 {
        builder = builder.variable(Variable::named(format!("free{i}")), ab());
    }
    let problem = builder.variable(Variable::named("stuck"), Vec::new()).build().unwrap();

    for strategy in STRATEGIES {
        let result = SearchRunner::run(&problem, &config(strategy));
        assert_eq!(result.status, SolveStatus::NoSolution, "{strategy}");
        assert!(result.stats.nodes_explored <= 1, "{strategy}: {}", result.stats.summary());
        assert_eq!(result.stats.backtracks, 0, "{strategy}");
    }
}

#[test]
fn always_violated_constraints_fail_every_strategy() {
    let (x, y) = (Variable::named("x"), Variable::named("y"));
    let problem = CspProblem::builder()
        .variable(x.clone(), ab())
        .variable(y.clone(), ab())
        .constraint(Predicate::new("impossible 1", vec![x.clone(), y.clone()], |_: &[&Value]| false))
        .constraint(Predicate::new("impossible 2", vec![y.clone()], |_: &[&Value]| false))
        .build()
        .unwrap();

    for strategy in STRATEGIES {
        let result = SearchRunner::run(&problem, &config(strategy));
        assert_eq!(result.status, SolveStatus::NoSolution, "{strategy}");
        assert!(result.assignment.is_none());
    }

    let optimizer = Optimizer::new(OptimizerConfig::default()).unwrap();
    for strategy in STRATEGIES {
        assert_eq!(optimizer.solve_with_strategy(&problem, strategy).status, SolveStatus::NoSolution);
    }
}

#[test]
fn unconstrained_instance_solves_without_backtracking() {
    let vars: Vec<Variable> = (0..5).map(|i| Variable::named(format!("v{i}"))).collect();
    let mut builder = CspProblem::builder();
    for v in &vars {
        builder = builder.variable(v.clone(), ab());
    }
    let problem = builder.build().unwrap();

    for strategy in STRATEGIES {
        let result = SearchRunner::run(&problem, &config(strategy));
        assert_eq!(result.status, SolveStatus::Solved, "{strategy}");
        assert_eq!(result.stats.backtracks, 0, "{strategy}");
        assert!(result.assignment.unwrap().is_complete(&vars));
    }
}

#[test]
fn decomposed_and_standard_paths_both_solve() {
    let vars: Vec<Variable> = (0..10).map(|i| Variable::named(format!("section{i}"))).collect();
    let slots = || (1..=5).map(|p| Value::named(format!("P{p}"))).collect::<Vec<_>>();
    let mut builder = CspProblem::builder();
    for v in &vars {
        builder = builder.variable(v.clone(), slots());
    }
    let problem = builder
        .constraint(AllDifferent::new("teacher 1", vars[..5].to_vec()))
        .constraint(AllDifferent::new("teacher 2", vars[5..].to_vec()))
        .build()
        .unwrap();

    let decomposing = Optimizer::new(
        OptimizerConfig::default()
            .with_variable_threshold(5)
            .with_cache(false),
    )
    .unwrap();
    let standard = Optimizer::new(OptimizerConfig::default().with_cache(false)).unwrap();

    let split = decomposing.solve(&problem);
    let whole = standard.solve(&problem);

    assert_eq!(split.path, SolvePath::Decomposed { subproblems: 2 });
    assert_eq!(whole.path, SolvePath::Standard);
    for result in [&split, &whole] {
        assert_eq!(result.status, SolveStatus::Solved);
        let a = result.assignment.as_ref().unwrap();
        assert!(a.is_complete(&vars));
        assert!(problem.is_solution(a));
    }
}

/// A time slot: day and period.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    day: u8,
    period: u8,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}P{}", self.day, self.period)
    }
}

#[test]
fn small_timetable_with_availability_and_preferences() {
    let sections: Vec<Variable> = ["math", "physics", "chemistry", "biology"]
        .into_iter()
        .map(|name| Variable::new(VariableKind::TimeSlotAssignment, name, format!("{name} section")))
        .collect();
    let slots: Vec<Value<Slot>> = (1..=2)
        .flat_map(|day| (1..=2).map(move |period| Slot { day, period }))
        .map(|slot| {
            let preference = if slot.period == 1 { 5.0 } else { 1.0 };
            Value::new(ValueKind::TimeSlot, slot, format!("day {} period {}", slot.day, slot.period))
                .with_preference(preference)
        })
        .collect();

    let mut builder = CspProblem::builder();
    for s in &sections {
        builder = builder.variable(s.clone(), slots.clone());
    }
    let problem = builder
        // One teacher covers math and physics, another chemistry and biology.
        .constraint(AllDifferent::new("teacher T1", sections[..2].to_vec()))
        .constraint(AllDifferent::new("teacher T2", sections[2..].to_vec()))
        .constraint(AllowedValues::new(
            "T1 only on day 1",
            sections[0].clone(),
            ["TIME_SLOT_D1P1", "TIME_SLOT_D1P2"],
        ))
        .constraint(Capacity::new("lab hours", sections[2].clone(), 2.0, |s: &Slot| f64::from(s.period)))
        .constraint(PreferValues::new("mornings", sections.clone(), 3.0, Priority::Medium))
        .build()
        .unwrap();

    for strategy in STRATEGIES {
        let result = SearchRunner::run(&problem, &config(strategy));
        assert_eq!(result.status, SolveStatus::Solved, "{strategy}");
        let a = result.assignment.unwrap();
        assert!(problem.is_solution(&a));
        assert_eq!(a.get(&sections[0]).unwrap().payload().day, 1);
        assert_eq!(a.get(&sections[2]).unwrap().payload().period, 2);

        let evaluation = problem.evaluate(&a);
        assert!(evaluation.is_feasible());
        assert_eq!(evaluation.hard_violations, 0);
    }
}

#[test]
fn diagnostics_name_the_violated_rule() {
    let (x, y) = (Variable::named("x"), Variable::named("y"));
    let problem = CspProblem::builder()
        .variable(x.clone(), ab())
        .variable(y.clone(), ab())
        .constraint(AllDifferent::new("room 101", vec![x.clone(), y.clone()]))
        .build()
        .unwrap();

    let clash = [(x.clone(), Value::named("A")), (y, Value::named("A"))].into_iter().collect();
    let evaluation = problem.evaluate(&clash);
    assert!(!evaluation.is_feasible());
    assert_eq!(evaluation.violations[0].constraint, "room 101");
    assert!(evaluation.affected_entities().contains(&"x"));
}

#[test]
fn strategy_names_parse() {
    assert_eq!("BACKTRACKING_AC3".parse::<Strategy>().unwrap(), Strategy::Ac3);
    assert_eq!("MIN_CONFLICTS".parse::<Strategy>().unwrap(), Strategy::MinConflicts);
    assert!("SIMPLEX".parse::<Strategy>().is_err());
}

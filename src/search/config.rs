//! Search configuration.

use crate::error::CspError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which search algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Backtracking with MRV/LCV ordering and forward checking.
    #[default]
    ForwardChecking,
    /// Backtracking with AC-3 run at every node.
    Ac3,
    /// Min-conflicts local search. Incomplete: may miss existing solutions.
    MinConflicts,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::ForwardChecking => "backtracking-forward-checking",
            Strategy::Ac3 => "backtracking-ac3",
            Strategy::MinConflicts => "min-conflicts",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CspError;

    /// Parses a strategy name, case-insensitively, with `_` and `-` treated alike.
    ///
    /// The optimizer-level names `parallel-backtracking`, `parallel-ac3`,
    /// `distributed-min-conflicts` and `hybrid` map onto the three engines.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "backtracking-forward-checking" | "forward-checking" | "backtracking"
            | "parallel-backtracking" | "hybrid" | "hybrid-approach" => Ok(Strategy::ForwardChecking),
            "backtracking-ac3" | "ac3" | "parallel-ac3" => Ok(Strategy::Ac3),
            "min-conflicts" | "distributed-min-conflicts" => Ok(Strategy::MinConflicts),
            _ => Err(CspError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Tie-break applied after least-constraining-value ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueOrder {
    /// Keep domain order (stable sort).
    #[default]
    DomainOrder,
    /// Prefer values with a higher preference score.
    Preference,
}

/// Simulated-annealing acceptance for min-conflicts.
///
/// When no variable has a strictly improving move, a random conflicted
/// variable takes a random value; a worsening move by `delta` conflicts is
/// kept with probability `exp(-delta / T)`. `T` starts at
/// `initial_temperature` each attempt and is multiplied by `cooling_rate`
/// after every step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annealing {
    pub initial_temperature: f64,

    /// Geometric cooling factor in (0, 1).
    pub cooling_rate: f64,
}

impl Default for Annealing {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.995,
        }
    }
}

impl Annealing {
    pub fn new(initial_temperature: f64, cooling_rate: f64) -> Self {
        Self {
            initial_temperature,
            cooling_rate,
        }
    }

    pub fn validate(&self) -> Result<(), CspError> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(CspError::InvalidConfig(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(CspError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }
}

/// Configuration for [`SearchRunner`](super::SearchRunner).
///
/// # Examples
///
/// ```
/// use u_csp::search::{SearchConfig, Strategy};
/// use std::time::Duration;
///
/// let config = SearchConfig::default()
///     .with_strategy(Strategy::MinConflicts)
///     .with_seed(7)
///     .with_max_restarts(3)
///     .with_time_limit(Duration::from_secs(5));
/// assert_eq!(config.step_multiplier, 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Algorithm to run.
    pub strategy: Strategy,

    /// Value ordering tie-break.
    pub value_order: ValueOrder,

    /// Random seed for min-conflicts. `None` draws a fresh seed.
    pub seed: Option<u64>,

    /// Min-conflicts step budget per attempt, as a multiple of the
    /// variable count.
    pub step_multiplier: usize,

    /// Extra min-conflicts attempts from a fresh random assignment after a
    /// stall or an exhausted budget. 0 keeps a single attempt.
    pub max_restarts: usize,

    /// Escape min-conflicts stalls by annealing instead of ending the
    /// attempt. `None` keeps pure descent.
    pub annealing: Option<Annealing>,

    /// Wall-clock cap. Expiry ends the search with
    /// [`SolveStatus::Timeout`](super::SolveStatus::Timeout).
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            value_order: ValueOrder::default(),
            seed: None,
            step_multiplier: 100,
            max_restarts: 0,
            annealing: None,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_step_multiplier(mut self, n: usize) -> Self {
        self.step_multiplier = n;
        self
    }

    pub fn with_max_restarts(mut self, n: usize) -> Self {
        self.max_restarts = n;
        self
    }

    pub fn with_annealing(mut self, annealing: Annealing) -> Self {
        self.annealing = Some(annealing);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.strategy, Strategy::ForwardChecking);
        assert_eq!(config.value_order, ValueOrder::DomainOrder);
        assert_eq!(config.step_multiplier, 100);
        assert_eq!(config.max_restarts, 0);
        assert!(config.seed.is_none());
        assert!(config.annealing.is_none());
        assert!(config.time_limit.is_none());
    }

    #[test]
    fn test_annealing_validation() {
        assert!(Annealing::default().validate().is_ok());
        assert_eq!(Annealing::default(), Annealing::new(100.0, 0.995));
        assert!(Annealing::new(0.0, 0.9).validate().is_err());
        assert!(Annealing::new(f64::NAN, 0.9).validate().is_err());
        assert!(Annealing::new(10.0, 1.0).validate().is_err());
        assert!(Annealing::new(10.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_strategy_round_trip_names() {
        for s in [Strategy::ForwardChecking, Strategy::Ac3, Strategy::MinConflicts] {
            assert_eq!(s.to_string().parse::<Strategy>(), Ok(s));
        }
    }

    #[test]
    fn test_strategy_aliases() {
        assert_eq!("PARALLEL_AC3".parse::<Strategy>(), Ok(Strategy::Ac3));
        assert_eq!("Hybrid_Approach".parse::<Strategy>(), Ok(Strategy::ForwardChecking));
        assert_eq!(
            "distributed-min-conflicts".parse::<Strategy>(),
            Ok(Strategy::MinConflicts)
        );
    }

    #[test]
    fn test_unknown_strategy() {
        assert_eq!(
            "genetic".parse::<Strategy>(),
            Err(CspError::UnknownStrategy("genetic".into()))
        );
    }
}

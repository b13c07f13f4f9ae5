//! Configuration options for the planner
//!
//! This module defines the parameters that control how long the planner
//! searches, how it balances exploration and exploitation, and how the
//! rollout reward is shaped.

use std::time::Duration;

use crate::problem::PROBABILITY_TOLERANCE;

/// Configuration for the MCTS planner
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use rally_mcts::PlannerConfig;
/// use std::time::Duration;
///
/// let config = PlannerConfig::default()
///     .with_exploration_constant(1.5)
///     .with_max_time(Duration::from_millis(200))
///     .with_tree_reuse(true);
/// ```
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Exploration constant for UCT
    ///
    /// Controls the balance between exploration and exploitation.
    /// The standard value is sqrt(2).
    pub exploration_constant: f64,

    /// Multiplier `k` of the level-based budget `k * (c1 * level + c2)` ms
    pub budget_scale_ms: u64,

    /// Per-level coefficient `c1` of the budget
    pub budget_per_level: u64,

    /// Constant term `c2` of the budget
    pub budget_base: u64,

    /// Explicit time budget per decision, overriding the level-based one
    pub max_time: Option<Duration>,

    /// Stop after this many iterations even if time remains
    pub max_iterations: Option<usize>,

    /// Carry the winning subtree over to the next decision
    pub reuse_tree: bool,

    /// Below this much fuel the vehicle may only refuel
    pub low_fuel_threshold: u32,

    /// Subtracted from the rollout reward when the rolled-out state is low
    /// on fuel; zero disables it
    pub low_fuel_penalty: f64,

    /// How far a movement distribution may stray from summing to one
    pub probability_tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            exploration_constant: std::f64::consts::SQRT_2,
            budget_scale_ms: 100,
            budget_per_level: 5,
            budget_base: 5,
            max_time: None,
            max_iterations: None,
            reuse_tree: false,
            low_fuel_threshold: 10,
            low_fuel_penalty: 0.0,
            probability_tolerance: PROBABILITY_TOLERANCE,
        }
    }
}

impl PlannerConfig {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the coefficients of the level-based budget `k * (c1 * level + c2)` ms
    pub fn with_level_budget(mut self, scale_ms: u64, per_level: u64, base: u64) -> Self {
        self.budget_scale_ms = scale_ms;
        self.budget_per_level = per_level;
        self.budget_base = base;
        self
    }

    /// Sets a fixed time budget per decision
    pub fn with_max_time(mut self, duration: Duration) -> Self {
        self.max_time = Some(duration);
        self
    }

    /// Sets the maximum number of iterations per decision
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Sets whether the winning subtree is kept between decisions
    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    pub fn with_low_fuel_threshold(mut self, threshold: u32) -> Self {
        self.low_fuel_threshold = threshold;
        self
    }

    pub fn with_low_fuel_penalty(mut self, penalty: f64) -> Self {
        self.low_fuel_penalty = penalty;
        self
    }

    pub fn with_probability_tolerance(mut self, tolerance: f64) -> Self {
        self.probability_tolerance = tolerance;
        self
    }

    /// Time allowed for one decision at the given level
    pub fn time_budget(&self, level: u8) -> Duration {
        self.max_time.unwrap_or_else(|| {
            let units = self.budget_per_level * u64::from(level) + self.budget_base;
            Duration::from_millis(self.budget_scale_ms * units)
        })
    }
}

//! # rally-mcts
//!
//! A Monte Carlo Tree Search (MCTS) planner for a stochastic, single-vehicle
//! race along a one-dimensional track.
//!
//! Each step the planner is handed the current [`VehicleState`] and, within a
//! wall-clock budget that grows with the problem's difficulty level, picks the
//! next [`Action`]: keep driving, or spend time swapping the car, driver,
//! tires, fuel or tire pressure to improve the odds of the next moves.
//!
//! ## Features
//!
//! - Arena-backed search tree with optional reuse across decisions
//! - UCT selection, discounted progress rollouts and pluggable policies
//! - Bayesian combination of car, driver and tire movement tables
//! - A seeded [`Simulator`] and an [`EpisodeDriver`] that restarts failed runs
//! - Detailed search statistics and tree visualization
//!
//! ## Basic Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use rally_mcts::problem::{Level, MOVE_OUTCOMES};
//! use rally_mcts::{MCTSEngine, PlannerConfig, ProblemModel, VehicleState};
//!
//! fn main() -> Result<(), rally_mcts::PlannerError> {
//!     let uniform = [1.0 / MOVE_OUTCOMES as f64; MOVE_OUTCOMES];
//!     let problem = ProblemModel::builder(Level::new(1)?)
//!         .with_terrains(vec!["gravel".to_string()])
//!         .with_track(vec![0; 20])
//!         .with_cars(vec![("hatch".to_string(), uniform)])
//!         .with_drivers(vec![("kim".to_string(), uniform)])
//!         .with_tires(vec![("mud".to_string(), uniform)])
//!         .with_fuel_usage(vec![vec![1]])
//!         .with_slip_probabilities(vec![0.1])
//!         .build()?;
//!
//!     // Keep the doctest quick
//!     let config = PlannerConfig::default()
//!         .with_max_iterations(50)
//!         .with_max_time(Duration::from_millis(100));
//!
//!     let mut engine = MCTSEngine::seeded(Arc::new(problem), config, 7);
//!     let action = engine.decide(&VehicleState::start())?;
//!
//!     println!("Search statistics: {}", engine.get_statistics().summary());
//!     println!("Next action: {}", action);
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Every iteration of a decision runs the four classic phases:
//!
//! 1. **Selection**: pick a child of the root with UCT. Children that have
//!    never been tried are visited first, in random order.
//!
//! 2. **Expansion**: materialise every legal action of the selected node.
//!
//! 3. **Simulation**: score one of the new children by its progress, slip or
//!    breakdown, discounted by how many non-moving actions led to it.
//!
//! 4. **Backpropagation**: add the score and a visit to every node from that
//!    child up to the root.
//!
//! When time runs out the most visited root action is recommended.
//!
//! ## Running a Race
//!
//! ```bash
//! cargo run --example race
//! ```

pub mod action;
pub mod config;
pub mod episode;
pub mod mcts;
pub mod policy;
pub mod problem;
pub mod simulator;
pub mod state;
pub mod stats;
pub mod transition;
pub mod tree;
pub mod utils;

pub use action::{Action, ActionCatalog, ActionKind};
pub use config::PlannerConfig;
pub use episode::{EpisodeConfig, EpisodeDriver, EpisodeReport};
pub use mcts::{MCTSEngine, SearchPhase};
pub use policy::{BackpropagationPolicy, SelectionPolicy, SimulationPolicy};
pub use problem::{Level, ProblemBuilder, ProblemModel};
pub use simulator::{Environment, Simulator};
pub use state::{Condition, TirePressure, VehicleState};
pub use stats::SearchStatistics;
pub use transition::{Outcome, OutcomeDistribution, TransitionModel};
pub use tree::{MCTSNode, NodeId, SearchTree};

/// Error types for the planner
#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    /// Problem or planner settings are malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A probability table or combined distribution does not sum to one
    #[error("Probability mass of {context} is {sum}, expected 1")]
    ProbabilityMass { context: String, sum: f64 },

    /// The action kind is not allowed at the problem's level
    #[error("Action {action} is not allowed at level {level}")]
    IllegalAction { action: action::Action, level: u8 },

    /// A fuel withdrawal larger than the tank holds
    #[error("Fuel exhausted: {required} required, {available} available")]
    FuelExhausted { required: u32, available: u32 },

    /// No legal actions are available from the current state
    #[error("No legal actions available from current state")]
    NoLegalActions,

    /// The environment could not carry on with the episode
    #[error("Simulation failed: {0}")]
    SimulationFailure(String),

    /// The episode gave up after too many failed attempts
    #[error("Episode aborted after {attempts} attempts")]
    EpisodeAborted { attempts: usize },
}

/// Result type for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

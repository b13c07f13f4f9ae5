//! Policies for different phases of the MCTS algorithm
//!
//! This module contains implementations of the policies used by the planner:
//! - Selection policies: How to choose which child to explore
//! - Simulation policies: How to roll out and score a node
//! - Backpropagation policies: How to update node statistics

pub mod backpropagation;
pub mod selection;
pub mod simulation;

pub use backpropagation::{BackpropagationPolicy, StandardPolicy};
pub use selection::{SelectionPolicy, UctPolicy};
pub use simulation::{ProgressRolloutPolicy, SimulationPolicy};

//! Simulation policies for the MCTS algorithm
//!
//! A simulation policy estimates the value of a node by rolling the vehicle
//! forward from its state and scoring what happened.

use rand::RngCore;

use crate::{
    transition::TransitionModel,
    tree::{NodeId, SearchTree},
    Result,
};

/// Trait for policies that score a rollout from a tree node
pub trait SimulationPolicy: Send + Sync {
    /// Rolls out from `node` and returns the reward to backpropagate
    fn simulate(
        &self,
        model: &TransitionModel,
        tree: &SearchTree,
        node: NodeId,
        rng: &mut dyn RngCore,
    ) -> Result<f64>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SimulationPolicy>;
}

/// One-step rollout rewarding forward progress
///
/// The node's state takes a single Continue step. Newly slipping costs the
/// slip-recovery duration and newly breaking down costs the repair duration;
/// otherwise the reward is the number of cells gained. The result is
/// discounted once for the move itself and once more for every non-move
/// action between the root and the node, since each of those spends a time
/// step before the vehicle gets going.
///
/// The discount therefore compounds per elapsed time step along the path.
/// A flat 0.9 applied once per rollout would rank a node behind three car
/// swaps the same as a bare Continue.
#[derive(Debug, Clone)]
pub struct ProgressRolloutPolicy {
    /// Per-step discount factor
    pub discount: f64,

    /// States below this much fuel are penalised
    pub low_fuel_threshold: u32,

    /// Penalty for ending the rollout low on fuel
    pub low_fuel_penalty: f64,
}

impl ProgressRolloutPolicy {
    /// Creates a rollout policy with no low-fuel penalty
    pub fn new(discount: f64) -> Self {
        ProgressRolloutPolicy {
            discount,
            low_fuel_threshold: 0,
            low_fuel_penalty: 0.0,
        }
    }

    /// Penalises rollouts that end below `threshold` fuel
    pub fn with_low_fuel_penalty(mut self, threshold: u32, penalty: f64) -> Self {
        self.low_fuel_threshold = threshold;
        self.low_fuel_penalty = penalty;
        self
    }

    fn setup_steps(tree: &SearchTree, node: NodeId) -> i32 {
        tree.ancestors(node)
            .filter_map(|id| tree.node(id).action)
            .filter(|action| !action.is_move())
            .count() as i32
    }
}

impl SimulationPolicy for ProgressRolloutPolicy {
    fn simulate(
        &self,
        model: &TransitionModel,
        tree: &SearchTree,
        node: NodeId,
        rng: &mut dyn RngCore,
    ) -> Result<f64> {
        let before = &tree.node(node).state;
        let after = model.step(before, rng)?;
        let problem = model.problem();

        let raw = if after.is_slipping() && !before.is_slipping() {
            -f64::from(problem.slip_recovery_time())
        } else if after.is_broken_down() && !before.is_broken_down() {
            -f64::from(problem.repair_time())
        } else {
            after.position() as f64 - before.position() as f64
        };

        let mut reward = raw * self.discount.powi(1 + Self::setup_steps(tree, node));
        if self.low_fuel_penalty != 0.0 && after.fuel() < self.low_fuel_threshold {
            reward -= self.low_fuel_penalty;
        }
        Ok(reward)
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy> {
        Box::new(self.clone())
    }
}

// Implement SimulationPolicy for Box<dyn SimulationPolicy>
impl SimulationPolicy for Box<dyn SimulationPolicy> {
    fn simulate(
        &self,
        model: &TransitionModel,
        tree: &SearchTree,
        node: NodeId,
        rng: &mut dyn RngCore,
    ) -> Result<f64> {
        (**self).simulate(model, tree, node, rng)
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy> {
        (**self).clone_box()
    }
}

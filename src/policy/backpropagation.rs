//! Folding rollout rewards back up the race tree
//!
//! Rollout rewards are signed. Cells gained count positive, while a fresh
//! slip or breakdown and a low-fuel penalty all drive the reward below
//! zero. Every node from the leaf to the root receives the same value, so
//! a node's mean reward is its expected discounted progress.

use crate::tree::MCTSNode;

/// Trait for policies that backpropagate simulation results
pub trait BackpropagationPolicy: Send + Sync {
    /// Updates statistics for a node based on a simulation result
    fn update_stats(&self, node: &mut MCTSNode, result: f64);

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn BackpropagationPolicy>;
}

/// Standard backpropagation policy
///
/// Counts the visit and adds the reward unchanged at every depth. Time
/// discounting already happened in the rollout.
#[derive(Debug, Clone)]
pub struct StandardPolicy;

impl StandardPolicy {
    /// Creates a new standard policy
    pub fn new() -> Self {
        StandardPolicy
    }
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackpropagationPolicy for StandardPolicy {
    fn update_stats(&self, node: &mut MCTSNode, result: f64) {
        node.increment_visits();
        node.add_reward(result);
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy> {
        Box::new(self.clone())
    }
}

// Implement BackpropagationPolicy for Box<dyn BackpropagationPolicy>
impl BackpropagationPolicy for Box<dyn BackpropagationPolicy> {
    fn update_stats(&self, node: &mut MCTSNode, result: f64) {
        (**self).update_stats(node, result)
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy> {
        (**self).clone_box()
    }
}

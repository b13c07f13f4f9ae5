//! Selection policies for the MCTS algorithm
//!
//! Selection policies decide which child of a node the next iteration
//! explores, balancing exploration and exploitation.

use rand::{seq::SliceRandom, RngCore};

use crate::{
    tree::{NodeId, SearchTree},
    utils::uct_value,
};

/// Trait for policies that select nodes to explore
pub trait SelectionPolicy: Send + Sync {
    /// Picks a child of `node`, or `None` if it has no children
    fn select_child(&self, tree: &SearchTree, node: NodeId, rng: &mut dyn RngCore)
        -> Option<NodeId>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SelectionPolicy>;
}

/// Upper Confidence bound applied to Trees (UCT)
///
/// ```text
/// UCT = mean_reward + exploration_constant * sqrt(ln(parent_visits) / child_visits)
/// ```
///
/// While the parent has fewer visits than children the policy is in its
/// warm-up phase and picks uniformly among children that have not been
/// visited yet, so every child is tried before the confidence bounds are
/// trusted.
#[derive(Debug, Clone)]
pub struct UctPolicy {
    /// Exploration constant; higher values favor less-visited nodes
    pub exploration_constant: f64,
}

impl UctPolicy {
    /// Creates a new UCT policy with the given exploration constant
    pub fn new(exploration_constant: f64) -> Self {
        UctPolicy {
            exploration_constant,
        }
    }

    /// UCT score of `child` under `parent`
    pub fn score(&self, tree: &SearchTree, parent: NodeId, child: NodeId) -> f64 {
        let child = tree.node(child);
        uct_value(
            child.total_reward(),
            child.visits(),
            tree.node(parent).visits(),
            self.exploration_constant,
        )
    }
}

impl Default for UctPolicy {
    fn default() -> Self {
        Self::new(std::f64::consts::SQRT_2)
    }
}

impl SelectionPolicy for UctPolicy {
    fn select_child(
        &self,
        tree: &SearchTree,
        node: NodeId,
        rng: &mut dyn RngCore,
    ) -> Option<NodeId> {
        let children = tree.children(node);
        if children.is_empty() {
            return None;
        }

        if (tree.node(node).visits() as usize) < children.len() {
            let unvisited: Vec<NodeId> = children
                .iter()
                .copied()
                .filter(|&child| tree.node(child).visits() == 0)
                .collect();
            let pool = if unvisited.is_empty() {
                children
            } else {
                &unvisited[..]
            };
            return pool.choose(rng).copied();
        }

        let mut best_value = f64::NEG_INFINITY;
        let mut best = children[0];
        for &child in children {
            let value = self.score(tree, node, child);
            if value > best_value {
                best_value = value;
                best = child;
            }
        }
        Some(best)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        Box::new(self.clone())
    }
}

// Implement SelectionPolicy for Box<dyn SelectionPolicy>
impl SelectionPolicy for Box<dyn SelectionPolicy> {
    fn select_child(
        &self,
        tree: &SearchTree,
        node: NodeId,
        rng: &mut dyn RngCore,
    ) -> Option<NodeId> {
        (**self).select_child(tree, node, rng)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        (**self).clone_box()
    }
}

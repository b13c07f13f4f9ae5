//! Tree data structures for Monte Carlo Tree Search
//!
//! Nodes live in an arena and refer to each other through [`NodeId`]
//! handles. A node owns the handles of its children; its parent handle is a
//! plain lookup. Dropping the arena frees the whole tree at once, and
//! [`SearchTree::reroot`] copies one subtree into a fresh arena so the
//! discarded siblings go with the old one.

use std::fmt;

use crate::{action::Action, state::VehicleState};

/// Handle of a node inside a [`SearchTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the MCTS tree
///
/// Each node contains the vehicle state, the action that led to it,
/// statistics about visits and rewards, and the handles of its children.
#[derive(Debug, Clone)]
pub struct MCTSNode {
    /// The vehicle state at this node
    pub state: VehicleState,

    /// The action that led to this state (None for root)
    pub action: Option<Action>,

    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    visits: u64,
    total_reward: f64,

    /// Depth of this node in the tree (root = 0)
    pub depth: usize,
}

impl MCTSNode {
    fn new(state: VehicleState, action: Option<Action>, parent: Option<NodeId>, depth: usize) -> Self {
        MCTSNode {
            state,
            action,
            parent,
            children: Vec::new(),
            expanded: false,
            visits: 0,
            total_reward: 0.0,
            depth,
        }
    }

    /// Returns the number of visits to this node
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Returns the total reward accumulated at this node
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Returns the average reward (value) of this node
    pub fn value(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.total_reward / self.visits as f64
    }

    /// Increments the visit count
    pub fn increment_visits(&mut self) {
        self.visits += 1;
    }

    /// Adds reward to the total
    pub fn add_reward(&mut self, reward: f64) {
        self.total_reward += reward;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// True once the node's full set of children has been materialised
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Returns true if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed search tree with a single root
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<MCTSNode>,
    root: NodeId,
}

impl SearchTree {
    /// Creates a tree holding only a root bound to `state`
    pub fn new(state: VehicleState) -> Self {
        SearchTree {
            nodes: vec![MCTSNode::new(state, None, None, 0)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Attaches the full child set of `parent`
    ///
    /// A node is expanded at most once; later calls leave the cached
    /// children untouched and return them.
    pub fn expand_with<I>(&mut self, parent: NodeId, children: I) -> &[NodeId]
    where
        I: IntoIterator<Item = (Action, VehicleState)>,
    {
        if !self.nodes[parent.0].expanded {
            let depth = self.nodes[parent.0].depth + 1;
            let mut handles = Vec::new();
            for (action, state) in children {
                let id = NodeId(self.nodes.len());
                self.nodes
                    .push(MCTSNode::new(state, Some(action), Some(parent), depth));
                handles.push(id);
            }
            let node = &mut self.nodes[parent.0];
            node.children = handles;
            node.expanded = true;
        }
        &self.nodes[parent.0].children
    }

    /// Walks from `id` up to and including the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Child of `id` with the highest visit count, first one on ties
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in self.children(id) {
            match best {
                Some(current) if self.node(current).visits() >= self.node(child).visits() => {}
                _ => best = Some(child),
            }
        }
        best
    }

    /// Builds a new tree rooted at `id`, keeping its subtree and statistics
    ///
    /// Everything outside the subtree is released together with `self`.
    pub fn reroot(self, id: NodeId) -> SearchTree {
        let base_depth = self.nodes[id.0].depth;
        let mut nodes: Vec<MCTSNode> = Vec::new();
        // (old handle, new parent handle)
        let mut queue = std::collections::VecDeque::from([(id, None)]);

        let mut old = self.nodes;
        while let Some((old_id, new_parent)) = queue.pop_front() {
            let new_id = NodeId(nodes.len());
            let mut node = std::mem::replace(
                &mut old[old_id.0],
                MCTSNode::new(VehicleState::start(), None, None, 0),
            );
            let old_children = std::mem::take(&mut node.children);
            queue.extend(old_children.into_iter().map(|child| (child, Some(new_id))));

            node.parent = new_parent;
            node.depth -= base_depth;
            if new_parent.is_none() {
                node.action = None;
            }
            nodes.push(node);
            if let Some(parent) = new_parent {
                nodes[parent.0].children.push(new_id);
            }
        }

        SearchTree {
            nodes,
            root: NodeId(0),
        }
    }

    /// Returns a visualization of the search tree
    pub fn visualize(&self) -> String {
        let mut result = String::new();
        self.visualize_node(self.root, &mut result);
        result
    }

    fn visualize_node(&self, id: NodeId, output: &mut String) {
        let node = self.node(id);
        let indent = "  ".repeat(node.depth);
        let action_str = match &node.action {
            Some(action) => action.to_string(),
            None => "Root".to_string(),
        };

        output.push_str(&format!(
            "{}{} (visits: {}, value: {:.3})\n",
            indent,
            action_str,
            node.visits(),
            node.value()
        ));

        for &child in node.children() {
            self.visualize_node(child, output);
        }
    }
}

/// Iterator over a node and its ancestors, see [`SearchTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a SearchTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

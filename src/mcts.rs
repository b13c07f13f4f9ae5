//! Main implementation of the Monte Carlo Tree Search planner
//!
//! This module contains the engine that orchestrates the four phases of
//! selection, expansion, simulation, and backpropagation for one decision.

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};

use crate::{
    action::{Action, ActionCatalog},
    config::PlannerConfig,
    policy::{
        backpropagation::{BackpropagationPolicy, StandardPolicy},
        selection::{SelectionPolicy, UctPolicy},
        simulation::{ProgressRolloutPolicy, SimulationPolicy},
    },
    problem::ProblemModel,
    state::VehicleState,
    stats::SearchStatistics,
    transition::TransitionModel,
    tree::{NodeId, SearchTree},
    PlannerError, Result,
};

/// Where the engine currently is within a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Selecting,
    Expanding,
    Simulating,
    Backpropagating,
    Done,
}

/// The Monte Carlo Tree Search planner
///
/// One [`decide`](Self::decide) call builds (or reuses) a search tree for the
/// given state, runs iterations until the wall-clock budget is spent, and
/// recommends the most visited root action.
pub struct MCTSEngine<R: RngCore = StdRng> {
    problem: Arc<ProblemModel>,

    transition: TransitionModel,

    catalog: ActionCatalog,

    /// Configuration for the search
    config: PlannerConfig,

    /// Source of every random draw the engine makes
    rng: R,

    /// Tree of the previous decision and its winning child
    last_tree: Option<(SearchTree, NodeId)>,

    /// Statistics gathered during the last decision
    statistics: SearchStatistics,

    phase: SearchPhase,

    /// Policy for selecting nodes during the selection phase
    selection_policy: Box<dyn SelectionPolicy>,

    /// Policy for scoring rollouts during the simulation phase
    simulation_policy: Box<dyn SimulationPolicy>,

    /// Policy for backpropagating results
    backpropagation_policy: Box<dyn BackpropagationPolicy>,
}

impl MCTSEngine<StdRng> {
    /// Creates an engine seeded from the operating system
    pub fn new(problem: Arc<ProblemModel>, config: PlannerConfig) -> Self {
        Self::with_rng(problem, config, StdRng::from_entropy())
    }

    /// Creates an engine with a deterministic generator
    pub fn seeded(problem: Arc<ProblemModel>, config: PlannerConfig, seed: u64) -> Self {
        Self::with_rng(problem, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> MCTSEngine<R> {
    /// Creates an engine drawing randomness from `rng`
    pub fn with_rng(problem: Arc<ProblemModel>, config: PlannerConfig, rng: R) -> Self {
        let selection_policy: Box<dyn SelectionPolicy> =
            Box::new(UctPolicy::new(config.exploration_constant));

        let simulation_policy: Box<dyn SimulationPolicy> = Box::new(
            ProgressRolloutPolicy::new(problem.discount())
                .with_low_fuel_penalty(config.low_fuel_threshold, config.low_fuel_penalty),
        );

        let backpropagation_policy: Box<dyn BackpropagationPolicy> =
            Box::new(StandardPolicy::new());

        MCTSEngine {
            transition: TransitionModel::new(Arc::clone(&problem))
                .with_tolerance(config.probability_tolerance),
            catalog: ActionCatalog::new(config.low_fuel_threshold),
            problem,
            config,
            rng,
            last_tree: None,
            statistics: SearchStatistics::new(),
            phase: SearchPhase::Idle,
            selection_policy,
            simulation_policy,
            backpropagation_policy,
        }
    }

    /// Sets the selection policy to use
    pub fn with_selection_policy<P: SelectionPolicy + 'static>(mut self, policy: P) -> Self {
        self.selection_policy = Box::new(policy);
        self
    }

    /// Sets the simulation policy to use
    pub fn with_simulation_policy<P: SimulationPolicy + 'static>(mut self, policy: P) -> Self {
        self.simulation_policy = Box::new(policy);
        self
    }

    /// Sets the backpropagation policy to use
    pub fn with_backpropagation_policy<P: BackpropagationPolicy + 'static>(
        mut self,
        policy: P,
    ) -> Self {
        self.backpropagation_policy = Box::new(policy);
        self
    }

    pub fn problem(&self) -> &ProblemModel {
        &self.problem
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn transition_model(&self) -> &TransitionModel {
        &self.transition
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Returns the statistics of the last decision
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Tree built by the last decision, before any re-rooting
    pub fn last_tree(&self) -> Option<&SearchTree> {
        self.last_tree.as_ref().map(|(tree, _)| tree)
    }

    /// Forgets the previous tree, e.g. when an episode restarts
    pub fn reset(&mut self) {
        self.last_tree = None;
        self.phase = SearchPhase::Idle;
    }

    /// Recommends the next action for `state`
    ///
    /// The root is expanded before the deadline is first checked, so even a
    /// zero budget yields a legal action.
    pub fn decide(&mut self, state: &VehicleState) -> Result<Action> {
        let start = Instant::now();
        let budget = self.config.time_budget(self.problem.level().number());

        self.statistics = SearchStatistics::new();
        self.statistics.time_budget = budget;
        self.phase = SearchPhase::Idle;

        let mut tree = match self.take_reusable_tree(state) {
            Some(tree) => {
                self.statistics.reused_tree = true;
                tree
            }
            None => SearchTree::new(state.clone()),
        };
        let root = tree.root();

        self.phase = SearchPhase::Expanding;
        self.expand(&mut tree, root);
        if tree.children(root).is_empty() {
            self.phase = SearchPhase::Done;
            return Err(PlannerError::NoLegalActions);
        }

        loop {
            if start.elapsed() >= budget {
                self.statistics.stopped_early = true;
                break;
            }
            if let Some(max) = self.config.max_iterations {
                if self.statistics.iterations >= max {
                    break;
                }
            }

            if let Err(err) = self.execute_iteration(&mut tree) {
                self.phase = SearchPhase::Done;
                return Err(err);
            }
            self.statistics.iterations += 1;
        }
        self.phase = SearchPhase::Done;

        let winner = tree
            .most_visited_child(root)
            .ok_or(PlannerError::NoLegalActions)?;
        let action = tree
            .node(winner)
            .action
            .ok_or(PlannerError::NoLegalActions)?;

        self.statistics.total_time = start.elapsed();
        self.statistics.tree_size = tree.len();
        debug!(
            "decided {} at {} after {} iterations ({} nodes, {:?} of {:?})",
            action,
            state,
            self.statistics.iterations,
            self.statistics.tree_size,
            self.statistics.total_time,
            budget
        );

        self.last_tree = Some((tree, winner));
        Ok(action)
    }

    /// Re-roots the previous tree at its winner if it describes `state`
    fn take_reusable_tree(&mut self, state: &VehicleState) -> Option<SearchTree> {
        let (tree, winner) = self.last_tree.take()?;
        if !self.config.reuse_tree {
            return None;
        }

        if tree.node(winner).state != *state {
            return None;
        }
        let tree = tree.reroot(winner);
        debug!("reusing subtree with {} nodes", tree.len());
        Some(tree)
    }

    /// Execute a single iteration of the MCTS algorithm
    fn execute_iteration(&mut self, tree: &mut SearchTree) -> Result<()> {
        let root = tree.root();

        // 1. Selection phase
        self.phase = SearchPhase::Selecting;
        let selected = self
            .selection_policy
            .select_child(tree, root, &mut self.rng)
            .ok_or(PlannerError::NoLegalActions)?;

        // 2. Expansion phase
        self.phase = SearchPhase::Expanding;
        self.expand(tree, selected);

        // 3. Simulation phase
        self.phase = SearchPhase::Simulating;
        let leaf = tree
            .children(selected)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(selected);
        let reward = self
            .simulation_policy
            .simulate(&self.transition, tree, leaf, &mut self.rng)?;

        // 4. Backpropagation phase
        self.phase = SearchPhase::Backpropagating;
        self.backpropagation(tree, leaf, reward);

        self.statistics.max_depth = self.statistics.max_depth.max(tree.node(leaf).depth);
        Ok(())
    }

    /// Expansion phase: materialise every child of `node` once
    fn expand(&self, tree: &mut SearchTree, node: NodeId) {
        if tree.node(node).is_expanded() {
            return;
        }
        let children = self.catalog.expand(&self.problem, &tree.node(node).state);
        tree.expand_with(node, children);
    }

    /// Backpropagation phase: update `leaf` and every ancestor up to the root
    fn backpropagation(&self, tree: &mut SearchTree, leaf: NodeId, reward: f64) {
        let path: Vec<NodeId> = tree.ancestors(leaf).collect();
        for id in path {
            self.backpropagation_policy
                .update_stats(tree.node_mut(id), reward);
        }
    }
}

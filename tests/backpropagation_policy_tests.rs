mod common;

use rally_mcts::policy::backpropagation::{BackpropagationPolicy, StandardPolicy};
use rally_mcts::{Action, MCTSEngine, PlannerConfig, SearchTree, VehicleState};

use common::{forced_problem, shared};

#[test]
fn test_standard_policy_accumulates() {
    let mut tree = SearchTree::new(VehicleState::start());
    let root = tree.root();
    let policy = StandardPolicy::new();

    policy.update_stats(tree.node_mut(root), 2.5);
    policy.update_stats(tree.node_mut(root), -1.0);

    let node = tree.node(root);
    assert_eq!(node.visits(), 2);
    assert!((node.total_reward() - 1.5).abs() < 1e-12);
    assert!((node.value() - 0.75).abs() < 1e-12);
}

#[test]
fn test_negative_rewards_are_kept() {
    let mut tree = SearchTree::new(VehicleState::start());
    let root = tree.root();
    let boxed: Box<dyn BackpropagationPolicy> = Box::new(StandardPolicy::new());

    boxed.update_stats(tree.node_mut(root), -2.0);
    assert_eq!(tree.node(root).total_reward(), -2.0);
}

#[test]
fn test_single_iteration_updates_whole_path() {
    let problem = shared(forced_problem(1, 20));
    let config = PlannerConfig::default()
        .with_max_iterations(1)
        .with_max_time(std::time::Duration::from_secs(5));
    let mut engine = MCTSEngine::seeded(problem, config, 11);

    engine.decide(&VehicleState::start()).expect("decision");
    assert_eq!(engine.get_statistics().iterations, 1);

    let tree = engine.last_tree().expect("tree kept");
    let root = tree.root();
    assert_eq!(tree.node(root).visits(), 1);

    // exactly one root child and one grandchild were visited
    let visited: Vec<_> = tree
        .children(root)
        .iter()
        .copied()
        .filter(|&child| tree.node(child).visits() > 0)
        .collect();
    assert_eq!(visited.len(), 1);
    let child = visited[0];

    let grandchildren: Vec<_> = tree
        .children(child)
        .iter()
        .copied()
        .filter(|&g| tree.node(g).visits() > 0)
        .collect();
    assert_eq!(grandchildren.len(), 1);
    let leaf = grandchildren[0];

    // every node on the path saw the same reward
    let reward = tree.node(leaf).total_reward();
    assert_eq!(tree.node(child).total_reward(), reward);
    assert_eq!(tree.node(root).total_reward(), reward);

    // reward is three cells, discounted once per step spent on the path
    let non_moves = [tree.node(child).action, tree.node(leaf).action]
        .iter()
        .flatten()
        .filter(|action| **action != Action::Continue)
        .count() as i32;
    let expected = 3.0 * 0.9f64.powi(1 + non_moves);
    assert!((reward - expected).abs() < 1e-9);
}

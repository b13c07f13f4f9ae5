mod common;

use std::time::Duration;

use rally_mcts::problem::CarId;
use rally_mcts::{Action, MCTSEngine, PlannerConfig, SearchTree, VehicleState};

use common::{forced_problem, shared};

#[test]
fn test_tree_visualization() {
    let problem = shared(forced_problem(1, 20));
    let config = PlannerConfig::default()
        .with_max_iterations(100)
        .with_max_time(Duration::from_secs(30));
    let mut engine = MCTSEngine::seeded(problem, config, 6);

    engine.decide(&VehicleState::start()).expect("decision");

    let tree = engine.last_tree().expect("tree kept");
    let visualization = tree.visualize();
    println!("Tree visualization:\n{}", visualization);

    assert!(visualization.starts_with("Root (visits: 100"));
    assert!(visualization.contains("\n  Continue (visits: "));
    assert!(visualization.contains("ChangeCar(1)"));
    assert!(visualization.contains("ChangeDriver(1)"));
    assert!(visualization.contains("ChangeTires(1)"));

    println!("{}", engine.get_statistics().summary());
}

#[test]
fn test_reroot_keeps_subtree_only() {
    let start = VehicleState::start();
    let mut tree = SearchTree::new(start.clone());
    let root = tree.root();
    let children = tree
        .expand_with(
            root,
            vec![
                (Action::Continue, start.clone()),
                (Action::ChangeCar(CarId(1)), start.with_car(CarId(1))),
            ],
        )
        .to_vec();
    let grandchildren = tree
        .expand_with(children[1], vec![(Action::Continue, start.with_car(CarId(1)))])
        .to_vec();
    tree.node_mut(grandchildren[0]).increment_visits();
    assert_eq!(tree.len(), 4);

    let rerooted = tree.reroot(children[1]);
    let new_root = rerooted.root();
    assert_eq!(rerooted.len(), 2);
    assert_eq!(rerooted.node(new_root).action, None);
    assert_eq!(rerooted.node(new_root).depth, 0);
    assert_eq!(rerooted.parent(new_root), None);

    let kept = rerooted.children(new_root)[0];
    assert_eq!(rerooted.node(kept).visits(), 1);
    assert_eq!(rerooted.node(kept).depth, 1);
    assert_eq!(rerooted.ancestors(kept).collect::<Vec<_>>(), vec![kept, new_root]);
}

mod common;

use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use rally_mcts::policy::simulation::{ProgressRolloutPolicy, SimulationPolicy};
use rally_mcts::problem::{CarId, DriverId, Level, TireId};
use rally_mcts::{
    Action, ProblemModel, SearchTree, TirePressure, TransitionModel, VehicleState,
};

use common::{forced_problem, one_hot, shared};

const SLIP: usize = 10;
const BREAKDOWN: usize = 11;

// Every factor table puts all its mass on one outcome
fn single_outcome_problem(outcome: usize) -> Arc<ProblemModel> {
    let problem = ProblemModel::builder(Level::new(1).expect("valid level"))
        .with_terrains(vec!["ice".to_string()])
        .with_track(vec![0; 10])
        .with_cars(vec![("car".to_string(), one_hot(outcome))])
        .with_drivers(vec![("driver".to_string(), one_hot(outcome))])
        .with_tires(vec![("tire".to_string(), one_hot(outcome))])
        .with_fuel_usage(vec![vec![1]])
        .with_slip_probabilities(vec![0.1])
        .with_slip_recovery_time(2)
        .with_repair_time(3)
        .build()
        .expect("valid problem");
    shared(problem)
}

fn rollout(model: &TransitionModel, policy: &ProgressRolloutPolicy, state: VehicleState) -> f64 {
    let tree = SearchTree::new(state);
    let mut rng = StdRng::seed_from_u64(12);
    policy
        .simulate(model, &tree, tree.root(), &mut rng)
        .expect("rollout")
}

#[test]
fn test_new_slip_costs_recovery_time() {
    let model = TransitionModel::new(single_outcome_problem(SLIP));
    let policy = ProgressRolloutPolicy::new(0.9);

    let reward = rollout(&model, &policy, VehicleState::start());
    assert!((reward - (-2.0 * 0.9)).abs() < 1e-9);
}

#[test]
fn test_new_breakdown_costs_repair_time() {
    let model = TransitionModel::new(single_outcome_problem(BREAKDOWN));
    let policy = ProgressRolloutPolicy::new(0.9);

    let reward = rollout(&model, &policy, VehicleState::start());
    assert!((reward - (-3.0 * 0.9)).abs() < 1e-9);
}

#[test]
fn test_waiting_out_a_slip_scores_zero() {
    let model = TransitionModel::new(single_outcome_problem(SLIP));
    let policy = ProgressRolloutPolicy::new(0.9);

    // already slipping: the step only counts the timer down
    let reward = rollout(&model, &policy, VehicleState::start().slipped(2));
    assert_eq!(reward, 0.0);
}

#[test]
fn test_low_fuel_penalty_is_subtracted() {
    let model = TransitionModel::new(shared(forced_problem(2, 20)));
    let state = VehicleState::new(5, CarId(0), 15, TirePressure::Hundred, DriverId(0), TireId(0))
        .expect("valid state");

    let plain = ProgressRolloutPolicy::new(0.9);
    let plain_reward = rollout(&model, &plain, state.clone());
    assert!((plain_reward - 2.7).abs() < 1e-9);

    // 15 - 2 leaves 13 units, below the threshold of 20
    let penalised = ProgressRolloutPolicy::new(0.9).with_low_fuel_penalty(20, 5.0);
    let penalised_reward = rollout(&model, &penalised, state.clone());
    assert!((penalised_reward - (2.7 - 5.0)).abs() < 1e-9);

    // above the threshold nothing changes
    let lenient = ProgressRolloutPolicy::new(0.9).with_low_fuel_penalty(10, 5.0);
    assert!((rollout(&model, &lenient, state) - 2.7).abs() < 1e-9);
}

#[test]
fn test_setup_actions_on_path_add_discount() {
    let model = TransitionModel::new(shared(forced_problem(1, 20)));
    let policy = ProgressRolloutPolicy::new(0.9);

    let start = VehicleState::start();
    let mut tree = SearchTree::new(start.clone());
    let root = tree.root();
    let swapped = tree.expand_with(root, vec![(Action::ChangeCar(CarId(1)), start.with_car(CarId(1)))])[0];

    let mut rng = StdRng::seed_from_u64(4);
    let reward = policy
        .simulate(&model, &tree, swapped, &mut rng)
        .expect("rollout");
    assert!((reward - 3.0 * 0.81).abs() < 1e-9);
}

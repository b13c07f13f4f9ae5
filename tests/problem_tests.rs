mod common;

use rally_mcts::problem::{CarId, Level, TerrainId, MOVE_OUTCOMES};
use rally_mcts::{ActionKind, PlannerError, ProblemBuilder, ProblemModel};

use common::{mixed_problem, one_hot, uniform};

fn base_builder() -> ProblemBuilder {
    ProblemModel::builder(Level::new(2).expect("valid level"))
        .with_terrains(vec!["dirt".to_string()])
        .with_track(vec![0; 5])
        .with_cars(vec![("van".to_string(), uniform())])
        .with_drivers(vec![("lee".to_string(), uniform())])
        .with_tires(vec![("slick".to_string(), one_hot(4))])
        .with_fuel_usage(vec![vec![3]])
        .with_slip_probabilities(vec![0.2])
}

#[test]
fn test_valid_problem_builds() {
    let problem = base_builder().build().expect("valid problem");
    assert_eq!(problem.track_length(), 5);
    assert_eq!(problem.terrain_at(5).expect("last cell"), TerrainId(0));
    assert_eq!(problem.fuel_usage(TerrainId(0), CarId(0)), 3);
    assert_eq!(problem.car_by_name("van"), Some(CarId(0)));
    assert_eq!(problem.car_by_name("truck"), None);
    assert!(problem.level().accounts_fuel());
}

#[test]
fn test_cells_outside_track_are_rejected() {
    let problem = base_builder().build().expect("valid problem");
    assert!(problem.terrain_at(0).is_err());
    assert!(problem.terrain_at(6).is_err());
}

#[test]
fn test_row_not_summing_to_one_is_rejected() {
    let mut row = uniform();
    row[0] += 0.01;
    let result = base_builder()
        .with_cars(vec![("van".to_string(), row)])
        .build();

    match result {
        Err(PlannerError::ProbabilityMass { sum, .. }) => {
            assert!((sum - 1.01).abs() < 1e-9);
        }
        other => panic!("expected ProbabilityMass, got {:?}", other),
    }
}

#[test]
fn test_nan_row_is_rejected() {
    let mut row = uniform();
    row[0] = f64::NAN;
    let result = base_builder()
        .with_drivers(vec![("lee".to_string(), row)])
        .build();

    assert!(matches!(result, Err(PlannerError::ProbabilityMass { .. })));
}

#[test]
fn test_fuel_usage_above_tank_is_rejected() {
    let result = base_builder().with_fuel_usage(vec![vec![51]]).build();
    assert!(matches!(result, Err(PlannerError::InvalidConfiguration(_))));

    let full_tank = base_builder().with_fuel_usage(vec![vec![50]]).build();
    assert!(full_tank.is_ok());
}

#[test]
fn test_shape_mismatches_are_rejected() {
    let empty_track = base_builder().with_track(Vec::new()).build();
    assert!(matches!(
        empty_track,
        Err(PlannerError::InvalidConfiguration(_))
    ));

    let unknown_terrain = base_builder().with_track(vec![0, 1]).build();
    assert!(matches!(
        unknown_terrain,
        Err(PlannerError::InvalidConfiguration(_))
    ));

    let fuel_table = base_builder().with_fuel_usage(vec![vec![1, 2]]).build();
    assert!(matches!(
        fuel_table,
        Err(PlannerError::InvalidConfiguration(_))
    ));

    let slip = base_builder().with_slip_probabilities(vec![1.5]).build();
    assert!(matches!(slip, Err(PlannerError::InvalidConfiguration(_))));

    let no_drivers = base_builder().with_drivers(Vec::new()).build();
    assert!(matches!(
        no_drivers,
        Err(PlannerError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_level_action_sets_are_cumulative() {
    let mut previous: Vec<ActionKind> = Vec::new();
    for number in 1..=5 {
        let level = Level::new(number).expect("standard level");
        assert!(previous.iter().all(|kind| level.allows(*kind)));
        previous = level.actions().to_vec();
    }
    assert_eq!(previous.len(), ActionKind::ALL.len());
    assert!(!Level::new(1).expect("level").accounts_fuel());
}

#[test]
fn test_custom_level_requires_continue() {
    assert!(Level::with_actions(2, vec![ActionKind::AddFuel]).is_err());
    let custom = Level::with_actions(2, vec![ActionKind::Continue, ActionKind::ChangePressure])
        .expect("custom level");
    assert!(custom.allows(ActionKind::ChangePressure));
    assert!(!custom.allows(ActionKind::ChangeCar));
}

#[test]
fn test_catalog_lookup() {
    let problem = mixed_problem(3);
    assert_eq!(problem.tire_count(), 3);
    assert_eq!(problem.terrain_count(), 2);
    assert_eq!(problem.tires().count(), 3);
    assert_eq!(problem.car_move_probabilities(CarId(1)).len(), MOVE_OUTCOMES);
}

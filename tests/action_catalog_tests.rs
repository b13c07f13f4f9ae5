mod common;

use rally_mcts::problem::{CarId, DriverId, Level, TireId};
use rally_mcts::state::FUEL_MAX;
use rally_mcts::{Action, ActionCatalog, ActionKind, PlannerError, TirePressure, VehicleState};

use common::{forced_problem, mixed_problem};

fn actions(children: &[(Action, VehicleState)]) -> Vec<Action> {
    children.iter().map(|(action, _)| *action).collect()
}

#[test]
fn test_level_one_children() {
    let problem = forced_problem(1, 10);
    let catalog = ActionCatalog::default();
    let children = catalog.expand(&problem, &VehicleState::start());

    assert_eq!(
        actions(&children),
        vec![
            Action::Continue,
            Action::ChangeCar(CarId(1)),
            Action::ChangeDriver(DriverId(1)),
            Action::ChangeTires(TireId(1)),
        ]
    );
}

#[test]
fn test_no_op_changes_are_excluded() {
    let problem = mixed_problem(5);
    let catalog = ActionCatalog::default();
    let start = VehicleState::start();
    let children = catalog.expand(&problem, &start);

    for (action, _) in &children {
        match *action {
            Action::ChangeCar(car) => assert_ne!(car, start.car()),
            Action::ChangeDriver(driver) => assert_ne!(driver, start.driver()),
            Action::ChangeTires(tire) => assert_ne!(tire, start.tire()),
            Action::ChangePressure(pressure) => assert_ne!(pressure, start.pressure()),
            Action::ChangeCarAndDriver(car, driver) => {
                assert_ne!(car, start.car());
                assert_ne!(driver, start.driver());
            }
            Action::ChangeTiresFuelPressure(tire, _, _) => assert_ne!(tire, start.tire()),
            // tank is already full
            Action::AddFuel(_) => panic!("refuelling a full tank"),
            Action::Continue => {}
        }
    }
}

#[test]
fn test_level_five_enumerates_compound_actions() {
    let problem = mixed_problem(5);
    let catalog = ActionCatalog::default();
    let children = catalog.expand(&problem, &VehicleState::start());

    // one other car x one other driver
    let car_and_driver = children
        .iter()
        .filter(|(action, _)| action.kind() == ActionKind::ChangeCarAndDriver)
        .count();
    assert_eq!(car_and_driver, 1);

    // two other tires x three pressures
    let tires_fuel_pressure = children
        .iter()
        .filter(|(action, _)| action.kind() == ActionKind::ChangeTiresFuelPressure)
        .count();
    assert_eq!(tires_fuel_pressure, 6);
}

#[test]
fn test_child_states_match_actions() {
    let problem = mixed_problem(4);
    let catalog = ActionCatalog::default();
    let start = VehicleState::start();

    for (action, state) in catalog.expand(&problem, &start) {
        assert_eq!(state, action.apply_to(&start));
    }
}

#[test]
fn test_low_fuel_forces_single_refuel() {
    let problem = mixed_problem(3);
    let catalog = ActionCatalog::new(10);
    let state = VehicleState::new(3, CarId(0), 4, TirePressure::Hundred, DriverId(0), TireId(0))
        .expect("valid state");

    let children = catalog.expand(&problem, &state);
    assert_eq!(actions(&children), vec![Action::AddFuel(FUEL_MAX - 4)]);
    assert_eq!(children[0].1.fuel(), FUEL_MAX);
}

#[test]
fn test_low_fuel_without_refuelling_swaps_car() {
    let problem = forced_problem(1, 10);
    let catalog = ActionCatalog::new(10);
    let state = VehicleState::new(3, CarId(0), 4, TirePressure::Hundred, DriverId(0), TireId(0))
        .expect("valid state");

    let children = catalog.expand(&problem, &state);
    assert_eq!(actions(&children), vec![Action::ChangeCar(CarId(1))]);
}

#[test]
fn test_stalled_vehicle_can_only_continue() {
    let problem = mixed_problem(5);
    let catalog = ActionCatalog::default();
    let broken = VehicleState::start().broken_down(2);

    let children = catalog.expand(&problem, &broken);
    assert_eq!(actions(&children), vec![Action::Continue]);
}

#[test]
fn test_refuel_time_steps() {
    assert_eq!(Action::Continue.time_steps(), 1);
    assert_eq!(Action::AddFuel(1).time_steps(), 1);
    assert_eq!(Action::AddFuel(10).time_steps(), 1);
    assert_eq!(Action::AddFuel(11).time_steps(), 2);
    assert_eq!(Action::AddFuel(50).time_steps(), 5);
    assert_eq!(Action::ChangeCar(CarId(1)).time_steps(), 1);
}

#[test]
fn test_level_legality() {
    let level = Level::new(2).expect("valid level");
    assert!(level.ensure_allows(&Action::AddFuel(5)).is_ok());
    assert!(matches!(
        level.ensure_allows(&Action::ChangeCarAndDriver(CarId(1), DriverId(1))),
        Err(PlannerError::IllegalAction { level: 2, .. })
    ));
    assert!(Level::new(6).is_err());
}

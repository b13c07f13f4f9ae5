//! Actions and the catalog that enumerates them
//!
//! [`Action`] carries exactly the parameters its kind needs. [`ActionCatalog`]
//! turns a state into the list of `(action, resulting state)` pairs the
//! search tree branches on.

use std::fmt;

use crate::{
    problem::{CarId, DriverId, ProblemModel, TireId},
    state::{TirePressure, VehicleState, FUEL_MAX},
};

/// Parameter-free discriminant of [`Action`], used for level legality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Continue,
    ChangeCar,
    ChangeDriver,
    ChangeTires,
    AddFuel,
    ChangePressure,
    ChangeCarAndDriver,
    ChangeTiresFuelPressure,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::Continue,
        ActionKind::ChangeCar,
        ActionKind::ChangeDriver,
        ActionKind::ChangeTires,
        ActionKind::AddFuel,
        ActionKind::ChangePressure,
        ActionKind::ChangeCarAndDriver,
        ActionKind::ChangeTiresFuelPressure,
    ];
}

/// A decision the planner can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Spend one time step moving (or waiting out a slip/breakdown)
    Continue,
    ChangeCar(CarId),
    ChangeDriver(DriverId),
    ChangeTires(TireId),
    AddFuel(u32),
    ChangePressure(TirePressure),
    ChangeCarAndDriver(CarId, DriverId),
    ChangeTiresFuelPressure(TireId, u32, TirePressure),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Continue => ActionKind::Continue,
            Action::ChangeCar(_) => ActionKind::ChangeCar,
            Action::ChangeDriver(_) => ActionKind::ChangeDriver,
            Action::ChangeTires(_) => ActionKind::ChangeTires,
            Action::AddFuel(_) => ActionKind::AddFuel,
            Action::ChangePressure(_) => ActionKind::ChangePressure,
            Action::ChangeCarAndDriver(..) => ActionKind::ChangeCarAndDriver,
            Action::ChangeTiresFuelPressure(..) => ActionKind::ChangeTiresFuelPressure,
        }
    }

    /// Only Continue advances the vehicle
    pub fn is_move(&self) -> bool {
        matches!(self, Action::Continue)
    }

    /// Time steps the action occupies; refuelling takes one step per 10 units
    pub fn time_steps(&self) -> u64 {
        match self {
            Action::AddFuel(amount) | Action::ChangeTiresFuelPressure(_, amount, _) => {
                u64::from(amount.div_ceil(10).max(1))
            }
            _ => 1,
        }
    }

    /// Applies a non-move action to a state
    ///
    /// Continue returns the state unchanged: moving is the transition
    /// model's job.
    pub fn apply_to(&self, state: &VehicleState) -> VehicleState {
        match *self {
            Action::Continue => state.clone(),
            Action::ChangeCar(car) => state.with_car(car),
            Action::ChangeDriver(driver) => state.with_driver(driver),
            Action::ChangeTires(tire) => state.with_tires(tire),
            Action::AddFuel(amount) => state.add_fuel(amount),
            Action::ChangePressure(pressure) => state.with_pressure(pressure),
            Action::ChangeCarAndDriver(car, driver) => state.with_car_and_driver(car, driver),
            Action::ChangeTiresFuelPressure(tire, amount, pressure) => {
                state.with_tires_fuel_pressure(tire, amount, pressure)
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Continue => write!(f, "Continue"),
            Action::ChangeCar(car) => write!(f, "ChangeCar({})", car),
            Action::ChangeDriver(driver) => write!(f, "ChangeDriver({})", driver),
            Action::ChangeTires(tire) => write!(f, "ChangeTires({})", tire),
            Action::AddFuel(amount) => write!(f, "AddFuel({})", amount),
            Action::ChangePressure(pressure) => write!(f, "ChangePressure({})", pressure),
            Action::ChangeCarAndDriver(car, driver) => {
                write!(f, "ChangeCarAndDriver({}, {})", car, driver)
            }
            Action::ChangeTiresFuelPressure(tire, amount, pressure) => {
                write!(f, "ChangeTiresFuelPressure({}, {}, {})", tire, amount, pressure)
            }
        }
    }
}

/// Enumerates the branching set of a state
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    low_fuel_threshold: u32,
}

impl ActionCatalog {
    /// Creates a catalog that forces refuelling below `low_fuel_threshold`
    pub fn new(low_fuel_threshold: u32) -> Self {
        ActionCatalog { low_fuel_threshold }
    }

    pub fn low_fuel_threshold(&self) -> u32 {
        self.low_fuel_threshold
    }

    /// Returns true if `state` is below the refuelling threshold
    pub fn is_low_on_fuel(&self, state: &VehicleState) -> bool {
        state.fuel() < self.low_fuel_threshold
    }

    /// Lists every child of `state`, skipping no-op changes
    ///
    /// A stalled vehicle can only wait. A vehicle low on fuel must refuel:
    /// only AddFuel is offered, or the refuelling car swaps when the level has
    /// no AddFuel.
    pub fn expand(
        &self,
        problem: &ProblemModel,
        state: &VehicleState,
    ) -> Vec<(Action, VehicleState)> {
        let level = problem.level();

        if state.is_stalled() {
            return vec![(Action::Continue, state.clone())];
        }

        if self.is_low_on_fuel(state) {
            if level.allows(ActionKind::AddFuel) {
                let mut children = Vec::with_capacity(1);
                self.push_kind(problem, state, ActionKind::AddFuel, &mut children);
                if !children.is_empty() {
                    return children;
                }
            } else if level.allows(ActionKind::ChangeCar) && problem.car_count() > 1 {
                let mut children = Vec::new();
                self.push_kind(problem, state, ActionKind::ChangeCar, &mut children);
                return children;
            }
        }

        let mut children = Vec::new();
        for &kind in level.actions() {
            self.push_kind(problem, state, kind, &mut children);
        }
        children
    }

    fn push_kind(
        &self,
        problem: &ProblemModel,
        state: &VehicleState,
        kind: ActionKind,
        out: &mut Vec<(Action, VehicleState)>,
    ) {
        let mut push = |action: Action| out.push((action, action.apply_to(state)));

        match kind {
            ActionKind::Continue => push(Action::Continue),
            ActionKind::ChangeCar => problem
                .cars()
                .filter(|car| *car != state.car())
                .for_each(|car| push(Action::ChangeCar(car))),
            ActionKind::ChangeDriver => problem
                .drivers()
                .filter(|driver| *driver != state.driver())
                .for_each(|driver| push(Action::ChangeDriver(driver))),
            ActionKind::ChangeTires => problem
                .tires()
                .filter(|tire| *tire != state.tire())
                .for_each(|tire| push(Action::ChangeTires(tire))),
            ActionKind::AddFuel => {
                let missing = FUEL_MAX - state.fuel();
                if missing > 0 {
                    push(Action::AddFuel(missing));
                }
            }
            ActionKind::ChangePressure => TirePressure::ALL
                .into_iter()
                .filter(|pressure| *pressure != state.pressure())
                .for_each(|pressure| push(Action::ChangePressure(pressure))),
            ActionKind::ChangeCarAndDriver => {
                for car in problem.cars().filter(|car| *car != state.car()) {
                    for driver in problem.drivers().filter(|d| *d != state.driver()) {
                        push(Action::ChangeCarAndDriver(car, driver));
                    }
                }
            }
            ActionKind::ChangeTiresFuelPressure => {
                let missing = FUEL_MAX - state.fuel();
                for tire in problem.tires().filter(|tire| *tire != state.tire()) {
                    for pressure in TirePressure::ALL {
                        push(Action::ChangeTiresFuelPressure(tire, missing, pressure));
                    }
                }
            }
        }
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new(10)
    }
}

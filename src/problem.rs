//! Static problem data consumed by the planner
//!
//! A [`ProblemModel`] describes one race: the track, the catalogs of cars,
//! drivers and tire models, and the probability tables that drive movement.
//! It is assembled with [`ProblemBuilder`], validated once, and then only
//! read.

use std::fmt;

use crate::{
    action::{Action, ActionKind},
    state::FUEL_MAX,
    PlannerError, Result,
};

/// Number of discrete movement outcomes: deltas -4..=5 plus slip and breakdown
pub const MOVE_OUTCOMES: usize = 12;

/// Smallest move delta a single step can produce
pub const MIN_MOVE: i32 = -4;

/// Largest move delta a single step can produce
pub const MAX_MOVE: i32 = 5;

/// Tolerance used when checking that probability rows sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One row of a per-factor movement table, indexed by outcome
pub type MoveProbabilities = [f64; MOVE_OUTCOMES];

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            /// Position of this entry in its catalog
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Index into the car catalog
    CarId
);
catalog_id!(
    /// Index into the driver catalog
    DriverId
);
catalog_id!(
    /// Index into the tire model catalog
    TireId
);
catalog_id!(
    /// Index into the terrain catalog
    TerrainId
);

/// Difficulty level of a problem
///
/// The level decides which action kinds are legal, whether fuel is consumed,
/// and how much wall-clock time the planner gets per decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    number: u8,
    actions: Vec<ActionKind>,
}

impl Level {
    /// Creates a standard level (1 to 5) with its cumulative action set
    pub fn new(number: u8) -> Result<Self> {
        use ActionKind::*;

        let actions = match number {
            1 => vec![Continue, ChangeCar, ChangeDriver, ChangeTires],
            2 | 3 => vec![
                Continue,
                ChangeCar,
                ChangeDriver,
                ChangeTires,
                AddFuel,
                ChangePressure,
            ],
            4 => vec![
                Continue,
                ChangeCar,
                ChangeDriver,
                ChangeTires,
                AddFuel,
                ChangePressure,
                ChangeCarAndDriver,
            ],
            5 => ActionKind::ALL.to_vec(),
            other => {
                return Err(PlannerError::InvalidConfiguration(format!(
                    "level {} is not one of the standard levels 1-5",
                    other
                )))
            }
        };

        Ok(Level { number, actions })
    }

    /// Creates a level with an explicit action set
    pub fn with_actions(number: u8, actions: Vec<ActionKind>) -> Result<Self> {
        if number == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "level number must be at least 1".to_string(),
            ));
        }
        if !actions.contains(&ActionKind::Continue) {
            return Err(PlannerError::InvalidConfiguration(
                "every level must allow Continue".to_string(),
            ));
        }
        Ok(Level { number, actions })
    }

    /// The difficulty number, used to size the search budget
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Action kinds legal at this level, in catalog order
    pub fn actions(&self) -> &[ActionKind] {
        &self.actions
    }

    /// Returns true if the given kind may be used at this level
    pub fn allows(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }

    /// Fails with [`PlannerError::IllegalAction`] if `action` is not allowed
    pub fn ensure_allows(&self, action: &Action) -> Result<()> {
        if self.allows(action.kind()) {
            Ok(())
        } else {
            Err(PlannerError::IllegalAction {
                action: *action,
                level: self.number,
            })
        }
    }

    /// Fuel is only tracked above the most basic level
    pub fn accounts_fuel(&self) -> bool {
        self.number > 1
    }
}

/// Read-only description of a race problem
#[derive(Debug, Clone)]
pub struct ProblemModel {
    level: Level,
    discount: f64,
    repair_time: u32,
    slip_recovery_time: u32,
    max_steps: u64,
    terrains: Vec<String>,
    track: Vec<TerrainId>,
    cars: Vec<String>,
    drivers: Vec<String>,
    tires: Vec<String>,
    fuel_usage: Vec<Vec<u32>>,
    car_moves: Vec<MoveProbabilities>,
    driver_moves: Vec<MoveProbabilities>,
    tire_moves: Vec<MoveProbabilities>,
    slip_probability: Vec<f64>,
    max_slip_probability: f64,
}

impl ProblemModel {
    /// Starts building a problem for the given level
    pub fn builder(level: Level) -> ProblemBuilder {
        ProblemBuilder::new(level)
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn repair_time(&self) -> u32 {
        self.repair_time
    }

    pub fn slip_recovery_time(&self) -> u32 {
        self.slip_recovery_time
    }

    /// Maximum number of time steps an episode may take before it fails
    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Track length N; cells are numbered 1..=N
    pub fn track_length(&self) -> usize {
        self.track.len()
    }

    /// Terrain of a 1-based cell
    pub fn terrain_at(&self, position: usize) -> Result<TerrainId> {
        position
            .checked_sub(1)
            .and_then(|cell| self.track.get(cell))
            .copied()
            .ok_or_else(|| {
                PlannerError::InvalidConfiguration(format!(
                    "position {} is outside the track 1..={}",
                    position,
                    self.track.len()
                ))
            })
    }

    /// Base fuel usage for one move of `car` on `terrain`
    pub fn fuel_usage(&self, terrain: TerrainId, car: CarId) -> u32 {
        self.fuel_usage[terrain.index()][car.index()]
    }

    pub fn car_move_probabilities(&self, car: CarId) -> &MoveProbabilities {
        &self.car_moves[car.index()]
    }

    pub fn driver_move_probabilities(&self, driver: DriverId) -> &MoveProbabilities {
        &self.driver_moves[driver.index()]
    }

    pub fn tire_move_probabilities(&self, tire: TireId) -> &MoveProbabilities {
        &self.tire_moves[tire.index()]
    }

    pub fn slip_probability(&self, terrain: TerrainId) -> f64 {
        self.slip_probability[terrain.index()]
    }

    pub fn max_slip_probability(&self) -> f64 {
        self.max_slip_probability
    }

    pub fn terrain_count(&self) -> usize {
        self.terrains.len()
    }

    pub fn terrain_name(&self, terrain: TerrainId) -> &str {
        &self.terrains[terrain.index()]
    }

    /// Car identifiers in catalog order
    pub fn cars(&self) -> impl Iterator<Item = CarId> + '_ {
        (0..self.cars.len()).map(CarId)
    }

    pub fn drivers(&self) -> impl Iterator<Item = DriverId> + '_ {
        (0..self.drivers.len()).map(DriverId)
    }

    pub fn tires(&self) -> impl Iterator<Item = TireId> + '_ {
        (0..self.tires.len()).map(TireId)
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn tire_count(&self) -> usize {
        self.tires.len()
    }

    pub fn car_name(&self, car: CarId) -> &str {
        &self.cars[car.index()]
    }

    pub fn driver_name(&self, driver: DriverId) -> &str {
        &self.drivers[driver.index()]
    }

    pub fn tire_name(&self, tire: TireId) -> &str {
        &self.tires[tire.index()]
    }

    /// Looks up a car by name
    pub fn car_by_name(&self, name: &str) -> Option<CarId> {
        self.cars.iter().position(|c| c == name).map(CarId)
    }

    pub fn driver_by_name(&self, name: &str) -> Option<DriverId> {
        self.drivers.iter().position(|d| d == name).map(DriverId)
    }

    pub fn tire_by_name(&self, name: &str) -> Option<TireId> {
        self.tires.iter().position(|t| t == name).map(TireId)
    }
}

/// Builder for [`ProblemModel`]
///
/// Every `with_*` method replaces the corresponding table; [`build`](Self::build)
/// checks that all tables agree in shape and that every probability row is a
/// proper distribution.
///
/// # Example
///
/// ```
/// use rally_mcts::problem::{Level, ProblemModel, MOVE_OUTCOMES};
///
/// let uniform = [1.0 / MOVE_OUTCOMES as f64; MOVE_OUTCOMES];
/// let problem = ProblemModel::builder(Level::new(1)?)
///     .with_terrains(vec!["asphalt".to_string()])
///     .with_track(vec![0; 10])
///     .with_cars(vec![("sedan".to_string(), uniform)])
///     .with_drivers(vec![("ana".to_string(), uniform)])
///     .with_tires(vec![("all-terrain".to_string(), uniform)])
///     .with_fuel_usage(vec![vec![2]])
///     .with_slip_probabilities(vec![0.05])
///     .build()?;
///
/// assert_eq!(problem.track_length(), 10);
/// # Ok::<(), rally_mcts::PlannerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    level: Level,
    discount: f64,
    repair_time: u32,
    slip_recovery_time: u32,
    max_steps: u64,
    terrains: Vec<String>,
    track: Vec<usize>,
    cars: Vec<(String, MoveProbabilities)>,
    drivers: Vec<(String, MoveProbabilities)>,
    tires: Vec<(String, MoveProbabilities)>,
    fuel_usage: Vec<Vec<u32>>,
    slip_probability: Vec<f64>,
    max_slip_probability: f64,
}

impl ProblemBuilder {
    /// Creates a builder with empty tables and default durations
    pub fn new(level: Level) -> Self {
        ProblemBuilder {
            level,
            discount: 0.9,
            repair_time: 2,
            slip_recovery_time: 2,
            max_steps: 100,
            terrains: Vec::new(),
            track: Vec::new(),
            cars: Vec::new(),
            drivers: Vec::new(),
            tires: Vec::new(),
            fuel_usage: Vec::new(),
            slip_probability: Vec::new(),
            max_slip_probability: 0.95,
        }
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_repair_time(mut self, steps: u32) -> Self {
        self.repair_time = steps;
        self
    }

    pub fn with_slip_recovery_time(mut self, steps: u32) -> Self {
        self.slip_recovery_time = steps;
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    /// Sets the terrain catalog
    pub fn with_terrains(mut self, terrains: Vec<String>) -> Self {
        self.terrains = terrains;
        self
    }

    /// Sets the terrain index of each cell, first cell first
    pub fn with_track(mut self, track: Vec<usize>) -> Self {
        self.track = track;
        self
    }

    /// Sets the car catalog with each car's movement table
    pub fn with_cars(mut self, cars: Vec<(String, MoveProbabilities)>) -> Self {
        self.cars = cars;
        self
    }

    pub fn with_drivers(mut self, drivers: Vec<(String, MoveProbabilities)>) -> Self {
        self.drivers = drivers;
        self
    }

    pub fn with_tires(mut self, tires: Vec<(String, MoveProbabilities)>) -> Self {
        self.tires = tires;
        self
    }

    /// Sets fuel usage indexed as `[terrain][car]`
    pub fn with_fuel_usage(mut self, fuel_usage: Vec<Vec<u32>>) -> Self {
        self.fuel_usage = fuel_usage;
        self
    }

    /// Sets the base slip probability of each terrain
    pub fn with_slip_probabilities(mut self, slip: Vec<f64>) -> Self {
        self.slip_probability = slip;
        self
    }

    pub fn with_max_slip_probability(mut self, max: f64) -> Self {
        self.max_slip_probability = max;
        self
    }

    /// Validates the tables and produces the problem
    pub fn build(self) -> Result<ProblemModel> {
        let invalid = |msg: String| Err(PlannerError::InvalidConfiguration(msg));

        if self.track.is_empty() {
            return invalid("track must contain at least one cell".to_string());
        }
        if self.terrains.is_empty() || self.cars.is_empty() || self.drivers.is_empty() {
            return invalid("terrain, car and driver catalogs must be non-empty".to_string());
        }
        if self.tires.is_empty() {
            return invalid("tire catalog must be non-empty".to_string());
        }
        if let Some(cell) = self.track.iter().position(|&t| t >= self.terrains.len()) {
            return invalid(format!(
                "cell {} uses terrain {} but only {} terrains exist",
                cell + 1,
                self.track[cell],
                self.terrains.len()
            ));
        }
        if self.fuel_usage.len() != self.terrains.len()
            || self.fuel_usage.iter().any(|row| row.len() != self.cars.len())
        {
            return invalid(format!(
                "fuel usage must be a {}x{} terrain-by-car table",
                self.terrains.len(),
                self.cars.len()
            ));
        }
        if let Some(usage) = self.fuel_usage.iter().flatten().find(|u| **u > FUEL_MAX) {
            return invalid(format!(
                "fuel usage {} exceeds tank capacity {}",
                usage, FUEL_MAX
            ));
        }
        if self.slip_probability.len() != self.terrains.len() {
            return invalid(format!(
                "expected {} slip probabilities, got {}",
                self.terrains.len(),
                self.slip_probability.len()
            ));
        }
        if let Some(p) = self
            .slip_probability
            .iter()
            .chain(std::iter::once(&self.max_slip_probability))
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return invalid(format!("slip probability {} is outside [0, 1]", p));
        }
        if !(0.0..=1.0).contains(&self.discount) || self.discount == 0.0 {
            return invalid(format!("discount {} must be in (0, 1]", self.discount));
        }

        let tables = self
            .cars
            .iter()
            .chain(self.drivers.iter())
            .chain(self.tires.iter());
        for (name, row) in tables {
            let sum: f64 = row.iter().sum();
            // NaN entries must fail this check
            let proper = (sum - 1.0).abs() <= PROBABILITY_TOLERANCE
                && row.iter().all(|p| p.is_finite() && *p >= 0.0);
            if !proper {
                return Err(PlannerError::ProbabilityMass {
                    context: format!("movement table for '{}'", name),
                    sum,
                });
            }
        }

        let (cars, car_moves) = self.cars.into_iter().unzip();
        let (drivers, driver_moves) = self.drivers.into_iter().unzip();
        let (tires, tire_moves) = self.tires.into_iter().unzip();

        Ok(ProblemModel {
            level: self.level,
            discount: self.discount,
            repair_time: self.repair_time,
            slip_recovery_time: self.slip_recovery_time,
            max_steps: self.max_steps,
            terrains: self.terrains,
            track: self.track.into_iter().map(TerrainId).collect(),
            cars,
            drivers,
            tires,
            fuel_usage: self.fuel_usage,
            car_moves,
            driver_moves,
            tire_moves,
            slip_probability: self.slip_probability,
            max_slip_probability: self.max_slip_probability,
        })
    }
}

//! Immutable vehicle snapshots
//!
//! A [`VehicleState`] is never changed in place. Every transition, whether it
//! comes from an action or from a sampled movement outcome, returns a new
//! value and leaves the original untouched so the search tree can keep every
//! intermediate state around.

use std::fmt;

use crate::{
    problem::{CarId, DriverId, TireId},
    PlannerError, Result,
};

/// Lowest amount of fuel a vehicle can hold
pub const FUEL_MIN: u32 = 0;

/// Tank capacity
pub const FUEL_MAX: u32 = 50;

/// The three discrete tire pressure settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TirePressure {
    Fifty,
    SeventyFive,
    Hundred,
}

impl TirePressure {
    pub const ALL: [TirePressure; 3] = [
        TirePressure::Fifty,
        TirePressure::SeventyFive,
        TirePressure::Hundred,
    ];

    /// Factor applied to fuel usage; soft tires burn more fuel
    pub fn fuel_multiplier(self) -> u32 {
        match self {
            TirePressure::Fifty => 3,
            TirePressure::SeventyFive => 2,
            TirePressure::Hundred => 1,
        }
    }

    /// Factor applied to the terrain slip probability; hard tires slip more
    pub fn slip_multiplier(self) -> f64 {
        match self {
            TirePressure::Fifty => 1.0,
            TirePressure::SeventyFive => 2.0,
            TirePressure::Hundred => 3.0,
        }
    }
}

impl fmt::Display for TirePressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TirePressure::Fifty => "50%",
            TirePressure::SeventyFive => "75%",
            TirePressure::Hundred => "100%",
        };
        f.write_str(text)
    }
}

/// Whether the vehicle is free to move
///
/// Slipping and breakdown carry the number of time steps left before the
/// vehicle can move again. The two can never be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Normal,
    Slipping { remaining: u32 },
    BrokenDown { remaining: u32 },
}

/// Snapshot of the simulated vehicle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleState {
    position: usize,
    condition: Condition,
    car: CarId,
    fuel: u32,
    pressure: TirePressure,
    driver: DriverId,
    tire: TireId,
}

impl VehicleState {
    /// Creates a state from its parts
    ///
    /// Fails if `position` is zero or `fuel` exceeds [`FUEL_MAX`].
    pub fn new(
        position: usize,
        car: CarId,
        fuel: u32,
        pressure: TirePressure,
        driver: DriverId,
        tire: TireId,
    ) -> Result<Self> {
        if position == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "positions are 1-based".to_string(),
            ));
        }
        if fuel > FUEL_MAX {
            return Err(PlannerError::InvalidConfiguration(format!(
                "fuel {} exceeds tank capacity {}",
                fuel, FUEL_MAX
            )));
        }
        Ok(VehicleState {
            position,
            condition: Condition::Normal,
            car,
            fuel,
            pressure,
            driver,
            tire,
        })
    }

    /// The fixed start state: first cell, full tank, 100% pressure and the
    /// first entry of every catalog
    pub fn start() -> Self {
        VehicleState {
            position: 1,
            condition: Condition::Normal,
            car: CarId(0),
            fuel: FUEL_MAX,
            pressure: TirePressure::Hundred,
            driver: DriverId(0),
            tire: TireId(0),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn is_slipping(&self) -> bool {
        matches!(self.condition, Condition::Slipping { .. })
    }

    pub fn is_broken_down(&self) -> bool {
        matches!(self.condition, Condition::BrokenDown { .. })
    }

    /// True when a slip or breakdown keeps the vehicle stationary
    pub fn is_stalled(&self) -> bool {
        self.condition != Condition::Normal
    }

    pub fn car(&self) -> CarId {
        self.car
    }

    pub fn fuel(&self) -> u32 {
        self.fuel
    }

    pub fn pressure(&self) -> TirePressure {
        self.pressure
    }

    pub fn driver(&self) -> DriverId {
        self.driver
    }

    pub fn tire(&self) -> TireId {
        self.tire
    }

    /// Moves by `delta` cells, clamped to the track `1..=track_length`
    pub fn moved_by(&self, delta: i32, track_length: usize) -> Self {
        let target = self.position as i64 + delta as i64;
        let position = target.clamp(1, track_length.max(1) as i64) as usize;
        VehicleState {
            position,
            ..self.clone()
        }
    }

    /// Enters the slip condition for `duration` steps
    pub fn slipped(&self, duration: u32) -> Self {
        VehicleState {
            condition: Condition::Slipping {
                remaining: duration,
            },
            ..self.clone()
        }
    }

    /// Enters the breakdown condition for `duration` steps
    pub fn broken_down(&self, duration: u32) -> Self {
        VehicleState {
            condition: Condition::BrokenDown {
                remaining: duration,
            },
            ..self.clone()
        }
    }

    /// Spends one time step of an active condition, clearing it at zero
    pub fn condition_ticked(&self) -> Self {
        let condition = match self.condition {
            Condition::Slipping { remaining } if remaining > 1 => Condition::Slipping {
                remaining: remaining - 1,
            },
            Condition::BrokenDown { remaining } if remaining > 1 => Condition::BrokenDown {
                remaining: remaining - 1,
            },
            _ => Condition::Normal,
        };
        VehicleState {
            condition,
            ..self.clone()
        }
    }

    /// Swaps the car; a fresh car comes with a full tank and 100% pressure
    pub fn with_car(&self, car: CarId) -> Self {
        VehicleState {
            car,
            fuel: FUEL_MAX,
            pressure: TirePressure::Hundred,
            ..self.clone()
        }
    }

    pub fn with_driver(&self, driver: DriverId) -> Self {
        VehicleState {
            driver,
            ..self.clone()
        }
    }

    /// Fits new tires, which are inflated to 100%
    pub fn with_tires(&self, tire: TireId) -> Self {
        VehicleState {
            tire,
            pressure: TirePressure::Hundred,
            ..self.clone()
        }
    }

    pub fn with_pressure(&self, pressure: TirePressure) -> Self {
        VehicleState {
            pressure,
            ..self.clone()
        }
    }

    /// Swaps car and driver in one step, with the car-change resets
    pub fn with_car_and_driver(&self, car: CarId, driver: DriverId) -> Self {
        self.with_car(car).with_driver(driver)
    }

    /// Fits new tires at the given pressure and refuels in one step
    pub fn with_tires_fuel_pressure(
        &self,
        tire: TireId,
        fuel: u32,
        pressure: TirePressure,
    ) -> Self {
        self.add_fuel(fuel).with_tires(tire).with_pressure(pressure)
    }

    /// Adds fuel, capped at [`FUEL_MAX`]
    pub fn add_fuel(&self, amount: u32) -> Self {
        VehicleState {
            fuel: self.fuel.saturating_add(amount).min(FUEL_MAX),
            ..self.clone()
        }
    }

    /// Burns fuel; going below [`FUEL_MIN`] is a bookkeeping error
    pub fn consume_fuel(&self, amount: u32) -> Result<Self> {
        let fuel = self
            .fuel
            .checked_sub(amount)
            .ok_or(PlannerError::FuelExhausted {
                required: amount,
                available: self.fuel,
            })?;
        Ok(VehicleState {
            fuel,
            ..self.clone()
        })
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos={} car={} driver={} tire={} fuel={} pressure={}",
            self.position, self.car, self.driver, self.tire, self.fuel, self.pressure
        )?;
        match self.condition {
            Condition::Normal => Ok(()),
            Condition::Slipping { remaining } => write!(f, " slipping({})", remaining),
            Condition::BrokenDown { remaining } => write!(f, " broken-down({})", remaining),
        }
    }
}

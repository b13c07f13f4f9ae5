//! Stochastic one-step movement model
//!
//! The probability of each movement outcome is assembled from independent
//! per-factor tables (car, driver, tire model) and a terrain/pressure slip
//! vector. Each factor table `P(outcome | factor)` is turned into a
//! posterior-style weight with Bayes' rule under uniform priors, the weights
//! are multiplied element-wise, and the product is renormalised:
//!
//! ```text
//! w_f(k)  = P(k | f) * (1 / |F|) / (1 / 12)
//! p(k)   ∝ w_car(k) * w_driver(k) * w_tire(k) * t(k) * (1 / 12)
//! ```
//!
//! where `t` puts the pressure-adjusted slip probability on SLIP and spreads
//! the rest evenly over the other eleven outcomes.

use log::trace;
use rand::{Rng, RngCore};
use std::fmt;
use std::sync::Arc;

use crate::{
    problem::{ProblemModel, MAX_MOVE, MIN_MOVE, MOVE_OUTCOMES, PROBABILITY_TOLERANCE},
    state::VehicleState,
    PlannerError, Result,
};

const SLIP_INDEX: usize = 10;
const BREAKDOWN_INDEX: usize = 11;

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Move by the given number of cells, -4..=5
    Move(i32),
    Slip,
    Breakdown,
}

impl Outcome {
    /// Maps a distribution index to its outcome
    pub fn from_index(index: usize) -> Option<Outcome> {
        match index {
            SLIP_INDEX => Some(Outcome::Slip),
            BREAKDOWN_INDEX => Some(Outcome::Breakdown),
            i if i < SLIP_INDEX => Some(Outcome::Move(MIN_MOVE + i as i32)),
            _ => None,
        }
    }

    /// Position of this outcome in a distribution
    pub fn index(self) -> usize {
        match self {
            Outcome::Move(delta) => (delta - MIN_MOVE) as usize,
            Outcome::Slip => SLIP_INDEX,
            Outcome::Breakdown => BREAKDOWN_INDEX,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Move(delta) => write!(f, "{:+}", delta),
            Outcome::Slip => f.write_str("SLIP"),
            Outcome::Breakdown => f.write_str("BREAKDOWN"),
        }
    }
}

/// A normalised distribution over the twelve outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeDistribution {
    probabilities: [f64; MOVE_OUTCOMES],
}

impl OutcomeDistribution {
    pub fn probabilities(&self) -> &[f64; MOVE_OUTCOMES] {
        &self.probabilities
    }

    pub fn probability(&self, outcome: Outcome) -> f64 {
        self.probabilities[outcome.index()]
    }

    pub fn sum(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Inverts the cumulative distribution at `u` in `[0, 1)`
    pub fn invert(&self, u: f64) -> Outcome {
        let mut cumulative = 0.0;
        let mut last_possible = 0;
        for (index, p) in self.probabilities.iter().enumerate() {
            if *p <= 0.0 {
                continue;
            }
            cumulative += p;
            last_possible = index;
            if u < cumulative {
                return Outcome::from_index(index).unwrap_or(Outcome::Move(0));
            }
        }
        // rounding left u just above the final cumulative value
        Outcome::from_index(last_possible).unwrap_or(Outcome::Move(0))
    }
}

/// Movement model bound to one problem
#[derive(Debug, Clone)]
pub struct TransitionModel {
    problem: Arc<ProblemModel>,
    tolerance: f64,
}

impl TransitionModel {
    pub fn new(problem: Arc<ProblemModel>) -> Self {
        TransitionModel {
            problem,
            tolerance: PROBABILITY_TOLERANCE,
        }
    }

    /// Sets how far a distribution may stray from summing to one
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn problem(&self) -> &ProblemModel {
        &self.problem
    }

    /// Fuel burnt by one move from `state`
    pub fn fuel_cost(&self, state: &VehicleState) -> Result<u32> {
        let terrain = self.problem.terrain_at(state.position())?;
        let base = self.problem.fuel_usage(terrain, state.car());
        base.checked_mul(state.pressure().fuel_multiplier())
            .ok_or_else(|| {
                PlannerError::InvalidConfiguration(format!(
                    "fuel usage {} overflows at {} pressure",
                    base,
                    state.pressure()
                ))
            })
    }

    /// Full outcome distribution for a move from `state`
    pub fn distribution(&self, state: &VehicleState) -> Result<OutcomeDistribution> {
        let problem = &self.problem;
        let terrain = problem.terrain_at(state.position())?;

        let prior_outcome = 1.0 / MOVE_OUTCOMES as f64;
        let car = posterior(
            problem.car_move_probabilities(state.car()),
            problem.car_count(),
        );
        let driver = posterior(
            problem.driver_move_probabilities(state.driver()),
            problem.driver_count(),
        );
        let tire = posterior(
            problem.tire_move_probabilities(state.tire()),
            problem.tire_count(),
        );

        let slip = (problem.slip_probability(terrain) * state.pressure().slip_multiplier())
            .min(problem.max_slip_probability());
        let other = (1.0 - slip) / (MOVE_OUTCOMES - 1) as f64;

        let mut probabilities = [0.0; MOVE_OUTCOMES];
        for (k, p) in probabilities.iter_mut().enumerate() {
            let terrain_pressure = if k == SLIP_INDEX { slip } else { other };
            *p = car[k] * driver[k] * tire[k] * terrain_pressure * prior_outcome;
        }

        let total: f64 = probabilities.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(PlannerError::ProbabilityMass {
                context: format!("movement distribution at cell {}", state.position()),
                sum: total,
            });
        }
        for p in probabilities.iter_mut() {
            *p /= total;
        }

        clip_to_track(
            &mut probabilities,
            state.position(),
            problem.track_length(),
        );

        let distribution = OutcomeDistribution { probabilities };
        let sum = distribution.sum();
        if (sum - 1.0).abs() > self.tolerance {
            return Err(PlannerError::ProbabilityMass {
                context: format!("movement distribution at cell {}", state.position()),
                sum,
            });
        }
        Ok(distribution)
    }

    /// Samples the outcome of a move from `state`
    ///
    /// Returns `None` when the tank cannot cover the move; the vehicle then
    /// stays put and burns nothing.
    pub fn sample_outcome<R: RngCore + ?Sized>(
        &self,
        state: &VehicleState,
        rng: &mut R,
    ) -> Result<Option<Outcome>> {
        if self.fuel_cost(state)? > state.fuel() {
            return Ok(None);
        }
        let distribution = self.distribution(state)?;
        let outcome = distribution.invert(rng.gen::<f64>());
        trace!("sampled {} from {}", outcome, state);
        Ok(Some(outcome))
    }

    /// Applies a sampled outcome, then charges fuel if the level tracks it
    pub fn apply_outcome(
        &self,
        state: &VehicleState,
        outcome: Outcome,
        fuel_cost: u32,
    ) -> Result<VehicleState> {
        let next = match outcome {
            Outcome::Slip => state.slipped(self.problem.slip_recovery_time()),
            Outcome::Breakdown => state.broken_down(self.problem.repair_time()),
            Outcome::Move(delta) => state.moved_by(delta, self.problem.track_length()),
        };

        if self.problem.level().accounts_fuel() {
            next.consume_fuel(fuel_cost)
        } else {
            Ok(next)
        }
    }

    /// Advances one time step of Continue from `state`
    ///
    /// A stalled vehicle only counts down its slip or repair timer.
    pub fn step<R: RngCore + ?Sized>(
        &self,
        state: &VehicleState,
        rng: &mut R,
    ) -> Result<VehicleState> {
        if state.is_stalled() {
            return Ok(state.condition_ticked());
        }

        let fuel_cost = self.fuel_cost(state)?;
        match self.sample_outcome(state, rng)? {
            Some(outcome) => self.apply_outcome(state, outcome, fuel_cost),
            None => Ok(state.clone()),
        }
    }
}

/// Bayes' rule with uniform priors over outcomes and over the factor's values
fn posterior(table: &[f64; MOVE_OUTCOMES], cardinality: usize) -> [f64; MOVE_OUTCOMES] {
    let prior_factor = 1.0 / cardinality as f64;
    let prior_outcome = 1.0 / MOVE_OUTCOMES as f64;
    let mut swapped = [0.0; MOVE_OUTCOMES];
    for (out, p) in swapped.iter_mut().zip(table.iter()) {
        *out = p * prior_factor / prior_outcome;
    }
    swapped
}

/// Folds the mass of moves that would leave `1..=track_length` into the move
/// that lands exactly on the boundary
fn clip_to_track(probabilities: &mut [f64; MOVE_OUTCOMES], position: usize, track_length: usize) {
    let position = position as i32;
    let track_length = track_length as i32;

    let lowest = (1 - position).max(MIN_MOVE);
    let highest = (track_length - position).min(MAX_MOVE);

    for delta in MIN_MOVE..lowest {
        let index = Outcome::Move(delta).index();
        probabilities[Outcome::Move(lowest).index()] += probabilities[index];
        probabilities[index] = 0.0;
    }
    for delta in (highest + 1)..=MAX_MOVE {
        let index = Outcome::Move(delta).index();
        probabilities[Outcome::Move(highest).index()] += probabilities[index];
        probabilities[index] = 0.0;
    }
}

//! In-process race environment
//!
//! The [`Simulator`] plays the role of the outside world: it holds the true
//! vehicle state, applies the actions the planner picks, and counts time
//! steps against the problem's step limit.

use std::sync::Arc;

use log::trace;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    action::Action, problem::ProblemModel, state::VehicleState, transition::TransitionModel,
    PlannerError, Result,
};

/// What an episode driver needs from the world it acts in
pub trait Environment {
    /// The state the next decision is made from
    fn current_state(&self) -> &VehicleState;

    /// Applies `action` and returns the resulting state
    ///
    /// [`PlannerError::SimulationFailure`] means the episode cannot go on and
    /// must be restarted; any other error is fatal.
    fn apply(&mut self, action: &Action) -> Result<VehicleState>;

    /// Returns to the start state with a fresh step count
    fn reset(&mut self);
}

/// Environment that samples movement from the problem's tables
pub struct Simulator<R: RngCore = StdRng> {
    problem: Arc<ProblemModel>,
    transition: TransitionModel,
    state: VehicleState,
    steps: u64,
    rng: R,
}

impl Simulator<StdRng> {
    pub fn new(problem: Arc<ProblemModel>) -> Self {
        Self::with_rng(problem, StdRng::from_entropy())
    }

    pub fn seeded(problem: Arc<ProblemModel>, seed: u64) -> Self {
        Self::with_rng(problem, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> Simulator<R> {
    pub fn with_rng(problem: Arc<ProblemModel>, rng: R) -> Self {
        Simulator {
            transition: TransitionModel::new(Arc::clone(&problem)),
            problem,
            state: VehicleState::start(),
            steps: 0,
            rng,
        }
    }

    /// Time steps used since the last reset
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl<R: RngCore> Environment for Simulator<R> {
    fn current_state(&self) -> &VehicleState {
        &self.state
    }

    fn apply(&mut self, action: &Action) -> Result<VehicleState> {
        self.problem.level().ensure_allows(action)?;

        let next = if action.is_move() {
            self.transition.step(&self.state, &mut self.rng)?
        } else {
            action.apply_to(&self.state)
        };

        self.steps += action.time_steps();
        if self.steps > self.problem.max_steps() {
            return Err(PlannerError::SimulationFailure(format!(
                "step limit of {} exceeded",
                self.problem.max_steps()
            )));
        }

        trace!("step {}: {} -> {}", self.steps, action, next);
        self.state = next.clone();
        Ok(next)
    }

    fn reset(&mut self) {
        self.state = VehicleState::start();
        self.steps = 0;
    }
}

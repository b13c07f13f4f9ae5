//! Episode loop around the planner
//!
//! [`EpisodeDriver`] repeatedly asks the engine for an action, applies it to
//! an [`Environment`], and starts over from scratch whenever the environment
//! reports a failure.

use log::{info, warn};
use rand::{rngs::StdRng, RngCore};

use crate::{
    action::Action, mcts::MCTSEngine, simulator::Environment, state::VehicleState, PlannerError,
    Result,
};

/// Limits applied to a whole episode
#[derive(Debug, Clone, Default)]
pub struct EpisodeConfig {
    /// Give up after this many failed attempts; `None` retries forever
    pub max_attempts: Option<usize>,
}

impl EpisodeConfig {
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// Summary of a finished episode
#[derive(Debug, Clone)]
pub struct EpisodeReport {
    /// Time steps used by the successful attempt
    pub steps: u64,

    /// Attempts made, including the successful one
    pub attempts: usize,

    /// Decisions requested from the planner across all attempts
    pub decisions: usize,

    /// Actions chosen during the successful attempt
    pub actions: Vec<Action>,

    pub final_state: VehicleState,
}

/// Drives an engine against an environment until the goal is reached
pub struct EpisodeDriver<E: Environment, R: RngCore = StdRng> {
    engine: MCTSEngine<R>,
    environment: E,
    config: EpisodeConfig,
}

impl<E: Environment, R: RngCore> EpisodeDriver<E, R> {
    pub fn new(engine: MCTSEngine<R>, environment: E) -> Self {
        EpisodeDriver {
            engine,
            environment,
            config: EpisodeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EpisodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine(&self) -> &MCTSEngine<R> {
        &self.engine
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Runs attempts until one reaches the last cell
    pub fn run(&mut self) -> Result<EpisodeReport> {
        let goal = self.engine.problem().track_length();
        let mut attempts = 1;
        let mut decisions = 0;
        let mut steps = 0;
        let mut actions = Vec::new();

        self.restart();
        let mut state = self.environment.current_state().clone();

        while state.position() < goal {
            let action = self.engine.decide(&state)?;
            decisions += 1;

            match self.advance(&action) {
                Ok((next, cost)) => {
                    state = next;
                    steps += cost;
                    actions.push(action);
                }
                Err(PlannerError::SimulationFailure(reason)) => {
                    warn!("Failed attempt ({}). Retrying...", reason);
                    if let Some(max) = self.config.max_attempts {
                        if attempts >= max {
                            return Err(PlannerError::EpisodeAborted { attempts });
                        }
                    }
                    attempts += 1;
                    steps = 0;
                    actions.clear();
                    self.restart();
                    state = self.environment.current_state().clone();
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            "Goal reached in {} steps after {} attempt(s)",
            steps, attempts
        );
        Ok(EpisodeReport {
            steps,
            attempts,
            decisions,
            actions,
            final_state: state,
        })
    }

    /// Applies `action`, followed by a Continue when it does not move
    fn advance(&mut self, action: &Action) -> Result<(VehicleState, u64)> {
        let mut state = self.environment.apply(action)?;
        let mut cost = action.time_steps();
        if !action.is_move() {
            state = self.environment.apply(&Action::Continue)?;
            cost += Action::Continue.time_steps();
        }
        Ok((state, cost))
    }

    fn restart(&mut self) {
        self.environment.reset();
        self.engine.reset();
    }
}

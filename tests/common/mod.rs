#![allow(dead_code)]

use std::sync::Arc;

use rally_mcts::problem::{Level, MoveProbabilities, MOVE_OUTCOMES};
use rally_mcts::{ProblemBuilder, ProblemModel};

/// Table index of the +3 move
pub const PLUS_THREE: usize = 7;

pub fn uniform() -> MoveProbabilities {
    [1.0 / MOVE_OUTCOMES as f64; MOVE_OUTCOMES]
}

pub fn one_hot(index: usize) -> MoveProbabilities {
    let mut row = [0.0; MOVE_OUTCOMES];
    row[index] = 1.0;
    row
}

/// A table leaning forward, with some slip and breakdown mass
pub fn skewed() -> MoveProbabilities {
    [
        0.05, 0.05, 0.1, 0.1, 0.2, 0.2, 0.1, 0.1, 0.03, 0.02, 0.03, 0.02,
    ]
}

fn named(prefix: &str, rows: Vec<MoveProbabilities>) -> Vec<(String, MoveProbabilities)> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| (format!("{}-{}", prefix, i), row))
        .collect()
}

/// Every factor always moves exactly three cells and nothing ever slips
pub fn forced_builder(level: u8, track_length: usize) -> ProblemBuilder {
    ProblemModel::builder(Level::new(level).expect("valid level"))
        .with_terrains(vec!["tarmac".to_string()])
        .with_track(vec![0; track_length])
        .with_cars(named("car", vec![one_hot(PLUS_THREE); 2]))
        .with_drivers(named("driver", vec![one_hot(PLUS_THREE); 2]))
        .with_tires(named("tire", vec![one_hot(PLUS_THREE); 2]))
        .with_fuel_usage(vec![vec![2, 3]])
        .with_slip_probabilities(vec![0.0])
}

pub fn forced_problem(level: u8, track_length: usize) -> ProblemModel {
    forced_builder(level, track_length)
        .build()
        .expect("forced problem is valid")
}

/// Two terrains alternating along the track with mixed tables
pub fn mixed_problem(level: u8) -> ProblemModel {
    ProblemModel::builder(Level::new(level).expect("valid level"))
        .with_terrains(vec!["asphalt".to_string(), "mud".to_string()])
        .with_track(vec![0, 1, 0, 1, 1, 0, 0, 1, 0, 1])
        .with_cars(named("car", vec![skewed(), uniform()]))
        .with_drivers(named("driver", vec![uniform(), skewed()]))
        .with_tires(named("tire", vec![skewed(), uniform(), skewed()]))
        .with_fuel_usage(vec![vec![1, 2], vec![3, 4]])
        .with_slip_probabilities(vec![0.05, 0.3])
        .build()
        .expect("mixed problem is valid")
}

pub fn shared(problem: ProblemModel) -> Arc<ProblemModel> {
    Arc::new(problem)
}

//! Race example for the MCTS planner
//!
//! This example drives a vehicle down a 40 cell track with the planner
//! choosing every action against a seeded simulator.
//!
//! ```bash
//! RUST_LOG=info cargo run --example race -- 3
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use rally_mcts::problem::{Level, MoveProbabilities};
use rally_mcts::{
    EpisodeConfig, EpisodeDriver, MCTSEngine, PlannerConfig, PlannerError, ProblemModel,
    Simulator,
};

//                        -4    -3    -2    -1     0    +1    +2    +3    +4    +5  slip break
const SPORTS: MoveProbabilities = [0.01, 0.01, 0.02, 0.03, 0.05, 0.10, 0.18, 0.22, 0.18, 0.12, 0.05, 0.03];
const TRUCK: MoveProbabilities = [0.01, 0.02, 0.04, 0.07, 0.12, 0.22, 0.24, 0.14, 0.07, 0.03, 0.03, 0.01];
const VETERAN: MoveProbabilities = [0.02, 0.02, 0.03, 0.05, 0.08, 0.15, 0.20, 0.18, 0.12, 0.08, 0.05, 0.02];
const ROOKIE: MoveProbabilities = [0.04, 0.04, 0.06, 0.08, 0.10, 0.15, 0.16, 0.13, 0.09, 0.05, 0.07, 0.03];
const SLICK: MoveProbabilities = [0.01, 0.01, 0.02, 0.04, 0.06, 0.12, 0.18, 0.20, 0.16, 0.12, 0.06, 0.02];
const KNOBBY: MoveProbabilities = [0.02, 0.03, 0.05, 0.07, 0.10, 0.18, 0.20, 0.15, 0.10, 0.05, 0.03, 0.02];

fn build_problem(level: u8) -> Result<ProblemModel, PlannerError> {
    // asphalt, gravel and mud in stretches
    let track = (0..40)
        .map(|cell| match cell / 5 % 4 {
            0 | 2 => 0,
            1 => 1,
            _ => 2,
        })
        .collect();

    ProblemModel::builder(Level::new(level)?)
        .with_terrains(vec!["asphalt".into(), "gravel".into(), "mud".into()])
        .with_track(track)
        .with_cars(vec![("sports".into(), SPORTS), ("truck".into(), TRUCK)])
        .with_drivers(vec![("veteran".into(), VETERAN), ("rookie".into(), ROOKIE)])
        .with_tires(vec![("slick".into(), SLICK), ("knobby".into(), KNOBBY)])
        .with_fuel_usage(vec![vec![2, 3], vec![3, 3], vec![5, 4]])
        .with_slip_probabilities(vec![0.02, 0.08, 0.2])
        .with_max_steps(120)
        .build()
}

fn main() -> Result<(), PlannerError> {
    // Initialize logging
    env_logger::init();

    let level = match env::args().nth(1) {
        Some(arg) => arg.parse::<u8>().map_err(|_| {
            PlannerError::InvalidConfiguration(format!("'{}' is not a level number", arg))
        })?,
        None => 2,
    };

    println!("MCTS Race Example (level {})", level);
    println!("==========================");

    let problem = Arc::new(build_problem(level)?);

    // Short budget so the demo finishes quickly
    let config = PlannerConfig::default().with_max_time(Duration::from_millis(50));

    let engine = MCTSEngine::new(Arc::clone(&problem), config);
    let simulator = Simulator::new(Arc::clone(&problem));
    let mut driver = EpisodeDriver::new(engine, simulator)
        .with_config(EpisodeConfig::default().with_max_attempts(5));

    let report = driver.run()?;

    println!();
    for (i, action) in report.actions.iter().enumerate() {
        println!("{:>3}. {}", i + 1, action);
    }
    println!();
    println!(
        "Finished at {} after {} steps ({} attempt(s), {} decisions)",
        report.final_state, report.steps, report.attempts, report.decisions
    );
    println!("{}", driver.engine().get_statistics().summary());

    Ok(())
}

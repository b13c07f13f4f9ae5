use rally_mcts::PlannerConfig;
use std::time::Duration;

#[test]
fn test_config_builder_methods() {
    let config = PlannerConfig::default()
        .with_exploration_constant(2.0)
        .with_max_iterations(5000)
        .with_max_time(Duration::from_secs(30))
        .with_tree_reuse(true)
        .with_low_fuel_threshold(15)
        .with_low_fuel_penalty(1.5)
        .with_probability_tolerance(1e-9);

    assert_eq!(config.exploration_constant, 2.0);
    assert_eq!(config.max_iterations, Some(5000));
    assert_eq!(config.max_time, Some(Duration::from_secs(30)));
    assert!(config.reuse_tree);
    assert_eq!(config.low_fuel_threshold, 15);
    assert_eq!(config.low_fuel_penalty, 1.5);
    assert_eq!(config.probability_tolerance, 1e-9);
}

#[test]
fn test_config_default_values() {
    let config = PlannerConfig::default();

    // Default exploration constant should be sqrt(2)
    assert!((config.exploration_constant - 1.414).abs() < 0.001);
    assert_eq!(config.max_iterations, None);
    assert_eq!(config.max_time, None);
    assert!(!config.reuse_tree);
    assert_eq!(config.low_fuel_threshold, 10);
    assert_eq!(config.low_fuel_penalty, 0.0);
}

#[test]
fn test_time_budget_grows_with_level() {
    let config = PlannerConfig::default();

    // 100 * (5 * level + 5) ms
    assert_eq!(config.time_budget(1), Duration::from_millis(1000));
    assert_eq!(config.time_budget(5), Duration::from_millis(3000));
}

#[test]
fn test_time_budget_overrides() {
    let scaled = PlannerConfig::default().with_level_budget(10, 2, 1);
    assert_eq!(scaled.time_budget(3), Duration::from_millis(70));

    let fixed = scaled.with_max_time(Duration::from_millis(25));
    assert_eq!(fixed.time_budget(3), Duration::from_millis(25));
}

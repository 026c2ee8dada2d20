use balance::AppConfig;
use ml::AdamConfig;
use rl::{CartPoleConfig, LearnCadence, TrainerConfig};
use std::path::Path;

#[test]
fn partial_file_keeps_remaining_defaults() {
    let config = AppConfig::load(Path::new("tests/data/short.json")).unwrap();
    assert_eq!(config.environments, 3);
    assert_eq!(config.checkpoint_every, 1);

    let trainer = TrainerConfig::from(config.trainer);
    assert_eq!(trainer.batch_count, 2);
    assert_eq!(trainer.cadence(), LearnCadence::PerBatch);
    assert_eq!(trainer.dt, TrainerConfig::default().dt);

    let adam = AdamConfig::from(config.adam);
    assert_eq!(adam.learning_rate, 0.001);
    assert_eq!(adam.beta2, AdamConfig::default().beta2);

    let cartpole = CartPoleConfig::from(config.cartpole);
    assert_eq!(cartpole.max_steps, 40);
    assert!((cartpole.failure_angle - 15f32.to_radians()).abs() < 1e-6);
    assert_eq!(cartpole.force_magnitude, 10.0);
}

#[test]
fn default_angles_survive_the_degree_conversion() {
    let cartpole = CartPoleConfig::from(AppConfig::default().cartpole);
    let expected = CartPoleConfig::default();
    assert!((cartpole.failure_angle - expected.failure_angle).abs() < 1e-6);
    assert!((cartpole.initial_angle - expected.initial_angle).abs() < 1e-6);
}

#[test]
fn missing_file_is_an_error() {
    let err = AppConfig::load(Path::new("tests/data/nope.json")).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

//! Analytic cart-pole balancing task.
//!
//! A pole is hinged on a cart that moves along a track. The agent pushes
//! the cart left or right with a fixed force and earns one point per step
//! until the pole tips past the angle limit, the cart leaves the track, or
//! the step cap is reached. Dynamics follow the classic frictionless
//! equations, integrated with explicit Euler.

use crate::env::{Action, ActionSpace, Env, EnvError};
use ml::{ActivationRegistry, Network, NnError};

/// Observation width.
pub const STATE_SIZE: usize = 4;
/// Push left, push right.
pub const ACTION_COUNT: usize = 2;

const CART_VELOCITY_SCALE: f32 = 2.0;
const POLE_VELOCITY_SCALE: f32 = 2.0;

/// Configuration for a [`CartPoleEnv`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartPoleConfig {
    /// Cart mass in kg
    pub cart_mass: f32,
    /// Pole mass in kg
    pub pole_mass: f32,
    /// Full pole length in meters
    pub pole_length: f32,
    pub gravity: f32,
    /// Force applied to the cart by either action, in newtons
    pub force_magnitude: f32,
    /// Cart position threshold for failure (meters)
    pub position_limit: f32,
    /// Pole angle threshold for failure (radians)
    pub failure_angle: f32,
    /// Reset draws the pole angle uniformly from `[-initial_angle, initial_angle]`
    pub initial_angle: f32,
    /// Episode length cap; zero disables it
    pub max_steps: usize,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            cart_mass: 1.0,
            pole_mass: 0.1,
            pole_length: 1.0,
            gravity: 9.8,
            force_magnitude: 10.0,
            position_limit: 2.4,
            failure_angle: 12f32.to_radians(),
            initial_angle: 0.05,
            max_steps: 500,
        }
    }
}

pub struct CartPoleEnv {
    config: CartPoleConfig,
    rng: fastrand::Rng,
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    steps: usize,
}

impl CartPoleEnv {
    /// Creates an environment and performs the first reset.
    #[must_use]
    pub fn new(config: CartPoleConfig, seed: u64) -> Self {
        let mut env = Self {
            config,
            rng: fastrand::Rng::with_seed(seed),
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            steps: 0,
        };
        env.reset();
        env
    }

    #[must_use]
    pub fn config(&self) -> &CartPoleConfig {
        &self.config
    }

    /// Unnormalised `(x, x_dot, theta, theta_dot)`.
    #[must_use]
    pub fn physical_state(&self) -> [f32; 4] {
        [self.x, self.x_dot, self.theta, self.theta_dot]
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn integrate(&mut self, force: f32, dt: f32) {
        let CartPoleConfig { cart_mass, pole_mass, pole_length, gravity, .. } = self.config;
        let total_mass = cart_mass + pole_mass;
        let half_length = pole_length * 0.5;
        let pole_moment = pole_mass * half_length;
        let (sin, cos) = self.theta.sin_cos();

        let temp = (force + pole_moment * self.theta_dot * self.theta_dot * sin) / total_mass;
        let theta_acc = (gravity * sin - cos * temp)
            / (half_length * (4.0 / 3.0 - pole_mass * cos * cos / total_mass));
        let x_acc = temp - pole_moment * theta_acc * cos / total_mass;

        self.x += dt * self.x_dot;
        self.x_dot += dt * x_acc;
        self.theta += dt * self.theta_dot;
        self.theta_dot += dt * theta_acc;
    }
}

impl Env for CartPoleEnv {
    fn reset(&mut self) {
        let jitter = self.config.initial_angle;
        self.x = 0.0;
        self.x_dot = 0.0;
        self.theta = (self.rng.f32() * 2.0 - 1.0) * jitter;
        self.theta_dot = 0.0;
        self.steps = 0;
    }

    fn is_done(&self) -> bool {
        let c = &self.config;
        self.x.abs() > c.position_limit
            || self.theta.abs() > c.failure_angle
            || (c.max_steps > 0 && self.steps >= c.max_steps)
    }

    fn state(&self) -> Vec<f32> {
        vec![
            self.x / self.config.position_limit,
            self.x_dot / CART_VELOCITY_SCALE,
            self.theta / self.config.failure_angle,
            self.theta_dot / POLE_VELOCITY_SCALE,
        ]
    }

    fn step(&mut self, dt: f32, action: &Action) -> Result<f32, EnvError> {
        let force = match action {
            Action::Discrete(0) => -self.config.force_magnitude,
            Action::Discrete(1) => self.config.force_magnitude,
            Action::Discrete(index) => {
                return Err(EnvError::InvalidAction { index: *index, count: ACTION_COUNT })
            }
            Action::Continuous(_) => return Err(EnvError::UnsupportedAction("continuous")),
        };
        if self.is_done() {
            return Err(EnvError::Failed("cart-pole stepped after termination".into()));
        }
        self.integrate(force, dt);
        self.steps += 1;
        Ok(1.0)
    }

    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete(ACTION_COUNT)
    }
}

/// The stock cart-pole policy: 4 -> 128 (relu) -> 64 (relu) -> 2 logits.
///
/// # Errors
///
/// Fails only if `registry` lacks `relu` or `identity`.
pub fn default_policy(registry: &ActivationRegistry, rng: &mut fastrand::Rng) -> Result<Network, NnError> {
    Network::mlp(registry, &[STATE_SIZE, 128, 64, ACTION_COUNT], "relu", "identity", rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushing_away_from_the_lean_tips_the_pole_further() {
        let mut env = CartPoleEnv::new(CartPoleConfig { initial_angle: 0.0, ..CartPoleConfig::default() }, 0);
        env.theta = 0.05;
        let mut last = env.theta_dot;
        for _ in 0..4 {
            env.step(0.02, &Action::Discrete(0)).unwrap();
            assert!(env.theta_dot > last);
            last = env.theta_dot;
        }
    }
}

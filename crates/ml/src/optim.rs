//! Parameter update rules.
//!
//! An optimizer owns per-parameter state shaped like the network it was
//! built for and applies one update per [`Optimizer::step`]. The network is
//! passed in on every call rather than held, so the owner (the agent) keeps
//! exclusive control of its parameters between steps.

use crate::{Network, NnError, ParameterGradient, Tensor};

pub trait Optimizer: Send + Sync {
    /// Applies one update using one gradient per layer, in forward order.
    ///
    /// Nothing is mutated unless every gradient matches its layer's shape.
    ///
    /// # Errors
    ///
    /// [`NnError::ShapeMismatch`] if the gradients or the optimizer state do
    /// not match `network`.
    fn step(&mut self, network: &mut Network, gradients: &[ParameterGradient]) -> Result<(), NnError>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.0005,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// First and second moment accumulators for one layer.
#[derive(Clone, Debug)]
struct Moments {
    m: ParameterGradient,
    v: ParameterGradient,
}

/// Adam with bias-corrected moments.
///
/// The timestep is shared by all layers and advances once per `step` call,
/// after the whole network has been updated. A layer whose gradient is
/// entirely zero still has its moments decayed but its parameters are left
/// untouched.
#[derive(Clone, Debug)]
pub struct Adam {
    config: AdamConfig,
    t: u32,
    moments: Vec<Moments>,
}

impl Adam {
    /// Creates zeroed moments for every layer currently in `network`.
    #[must_use]
    pub fn new(network: &Network, config: AdamConfig) -> Self {
        let moments = network
            .layers()
            .iter()
            .map(|layer| Moments {
                m: ParameterGradient::zeros_for(layer),
                v: ParameterGradient::zeros_for(layer),
            })
            .collect();
        Self { config, t: 1, moments }
    }

    #[must_use]
    pub fn config(&self) -> AdamConfig {
        self.config
    }

    /// Timestep the next `step` call will use for bias correction.
    #[must_use]
    pub fn timestep(&self) -> u32 {
        self.t
    }

    fn update(&self, param: &mut Tensor, grad: &Tensor, m: &mut Tensor, v: &mut Tensor, apply: bool) {
        let AdamConfig { learning_rate: lr, beta1: b1, beta2: b2, epsilon: eps } = self.config;
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        let bc1 = 1.0 - b1.powi(t);
        let bc2 = 1.0 - b2.powi(t);

        param
            .data
            .iter_mut()
            .zip(&grad.data)
            .zip(m.data.iter_mut())
            .zip(v.data.iter_mut())
            .for_each(|(((p, g), m), v)| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                if apply {
                    let m_hat = *m / bc1;
                    let v_hat = *v / bc2;
                    *p -= lr * m_hat / (v_hat.sqrt() + eps);
                }
            });
    }
}

impl Optimizer for Adam {
    fn step(&mut self, network: &mut Network, gradients: &[ParameterGradient]) -> Result<(), NnError> {
        network.check_gradients(gradients)?;
        network.check_gradients(self.moments.iter().map(|state| &state.m))?;

        let mut moments = std::mem::take(&mut self.moments);
        for ((layer, grad), state) in network.layers_mut().iter_mut().zip(gradients).zip(&mut moments) {
            let apply = !grad.is_zero();
            let (w, b) = layer.params_mut();
            self.update(w, &grad.d_weights, &mut state.m.d_weights, &mut state.v.d_weights, apply);
            self.update(b, &grad.d_biases, &mut state.m.d_biases, &mut state.v.d_biases, apply);
        }
        self.moments = moments;

        tracing::trace!(timestep = self.t, "adam step");
        self.t = self.t.saturating_add(1);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SgdConfig {
    pub learning_rate: f32,
    pub momentum: f32,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            momentum: 0.9,
        }
    }
}

/// Gradient descent with heavy-ball momentum: `v = μ·v + g; p -= lr·v`.
#[derive(Clone, Debug)]
pub struct SgdMomentum {
    config: SgdConfig,
    velocity: Vec<ParameterGradient>,
}

impl SgdMomentum {
    #[must_use]
    pub fn new(network: &Network, config: SgdConfig) -> Self {
        Self {
            config,
            velocity: network.zero_gradients(),
        }
    }

    #[must_use]
    pub fn config(&self) -> SgdConfig {
        self.config
    }
}

fn momentum_update(param: &mut Tensor, grad: &Tensor, velocity: &mut Tensor, lr: f32, mu: f32) {
    param
        .data
        .iter_mut()
        .zip(&grad.data)
        .zip(velocity.data.iter_mut())
        .for_each(|((p, g), v)| {
            *v = mu * *v + g;
            *p -= lr * *v;
        });
}

impl Optimizer for SgdMomentum {
    fn step(&mut self, network: &mut Network, gradients: &[ParameterGradient]) -> Result<(), NnError> {
        network.check_gradients(gradients)?;
        network.check_gradients(&self.velocity)?;

        let SgdConfig { learning_rate: lr, momentum: mu } = self.config;
        for ((layer, grad), vel) in network.layers_mut().iter_mut().zip(gradients).zip(&mut self.velocity) {
            let (w, b) = layer.params_mut();
            momentum_update(w, &grad.d_weights, &mut vel.d_weights, lr, mu);
            momentum_update(b, &grad.d_biases, &mut vel.d_biases, lr, mu);
        }
        Ok(())
    }
}

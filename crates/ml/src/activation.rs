//! Named element-wise nonlinearities.
//!
//! An [`ActivationRegistry`] is built once at startup and handed by reference
//! to whatever constructs layers or loads model files. Layers copy the
//! [`Activation`] they need, so the registry is never consulted on the hot
//! path and never mutated once training begins.

use crate::NnError;
use std::collections::HashMap;

/// A named nonlinearity with its derivative.
///
/// Both maps act element-wise. The derivative is evaluated at the
/// pre-activation, not at the activation output.
#[derive(Clone, Copy, Debug)]
pub struct Activation {
    name: &'static str,
    forward: fn(f32) -> f32,
    derivative: fn(f32) -> f32,
}

impl Activation {
    #[must_use]
    pub const fn new(name: &'static str, forward: fn(f32) -> f32, derivative: fn(f32) -> f32) -> Self {
        Self { name, forward, derivative }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn apply(&self, z: &[f32]) -> Vec<f32> {
        z.iter().map(|&v| (self.forward)(v)).collect()
    }

    #[must_use]
    pub fn derivative(&self, z: &[f32]) -> Vec<f32> {
        z.iter().map(|&v| (self.derivative)(v)).collect()
    }
}

impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn relu(v: f32) -> f32 {
    v.max(0.0)
}

fn relu_prime(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else {
        0.0
    }
}

fn identity(v: f32) -> f32 {
    v
}

fn identity_prime(_v: f32) -> f32 {
    1.0
}

fn tanh_prime(v: f32) -> f32 {
    let t = v.tanh();
    1.0 - t * t
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

fn sigmoid_prime(v: f32) -> f32 {
    let s = sigmoid(v);
    s * (1.0 - s)
}

pub const RELU: Activation = Activation::new("relu", relu, relu_prime);
pub const IDENTITY: Activation = Activation::new("identity", identity, identity_prime);
pub const TANH: Activation = Activation::new("tanh", f32::tanh, tanh_prime);
pub const SIGMOID: Activation = Activation::new("sigmoid", sigmoid, sigmoid_prime);

/// Lookup table from activation name to [`Activation`].
#[derive(Clone, Debug, Default)]
pub struct ActivationRegistry {
    entries: HashMap<&'static str, Activation>,
}

impl ActivationRegistry {
    /// An empty registry. Most callers want [`ActivationRegistry::with_defaults`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `relu`, `identity`, `tanh` and `sigmoid`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for activation in [RELU, IDENTITY, TANH, SIGMOID] {
            registry.register(activation);
        }
        registry
    }

    /// Adds `activation`, replacing any entry with the same name.
    pub fn register(&mut self, activation: Activation) {
        self.entries.insert(activation.name, activation);
    }

    /// # Errors
    ///
    /// Returns [`NnError::UnknownActivation`] if `name` was never registered.
    pub fn get(&self, name: &str) -> Result<Activation, NnError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| NnError::UnknownActivation(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

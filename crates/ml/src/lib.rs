#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]
//! # Policy network building blocks
//!
//! Small, dependency-light feed-forward networks with hand-written
//! backpropagation, sized for control policies with a handful of inputs and
//! outputs.
//!
//! -   **Activations:** [`ActivationRegistry`] maps names to element-wise
//!     nonlinearities and their derivatives.
//! -   **Layers:** [`Layer`] is an affine transform plus activation. Its
//!     `forward` is pure and returns a [`LayerCache`] that is threaded into
//!     `backward`, so a shared network can be evaluated from many threads.
//! -   **Networks:** [`Network`] chains layers and produces one
//!     [`ParameterGradient`] per layer on the way back.
//! -   **Optimizers:** [`Adam`] and [`SgdMomentum`] implement [`Optimizer`].
//! -   **Persistence:** [`Network::save`] / [`Network::load`] use a plain
//!     line-oriented text format (see [`persist`]).
//!
//! ```rust,ignore
//! use ml::{ActivationRegistry, Adam, AdamConfig, Network, Optimizer};
//!
//! let registry = ActivationRegistry::with_defaults();
//! let mut rng = fastrand::Rng::with_seed(7);
//! let mut net = Network::mlp(&registry, &[4, 16, 2], "relu", "identity", &mut rng)?;
//! let mut adam = Adam::new(&net, AdamConfig::default());
//!
//! let (y, cache) = net.forward(&[0.1, 0.2, 0.3, 0.4]);
//! let grads = net.backward(&cache, &[y[0], 0.0]);
//! adam.step(&mut net, &grads)?;
//! ```

pub mod activation;
pub mod error;
pub mod layer;
pub mod network;
pub mod optim;
pub mod persist;
pub mod tensor;

pub use activation::{Activation, ActivationRegistry, IDENTITY, RELU, SIGMOID, TANH};
pub use error::NnError;
pub use layer::{Layer, LayerCache, ParameterGradient};
pub use network::{ForwardCache, Network};
pub use optim::{Adam, AdamConfig, Optimizer, SgdConfig, SgdMomentum};
pub use tensor::Tensor;

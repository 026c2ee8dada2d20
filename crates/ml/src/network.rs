use crate::{ActivationRegistry, Layer, LayerCache, NnError, ParameterGradient};

/// An append-only stack of [`Layer`]s where each layer's output feeds the next.
#[derive(Clone, Debug, Default)]
pub struct Network {
    layers: Vec<Layer>,
}

/// Per-layer caches from one [`Network::forward`] call, in forward order.
#[derive(Clone, Debug)]
pub struct ForwardCache {
    layers: Vec<LayerCache>,
}

impl ForwardCache {
    #[must_use]
    pub fn layers(&self) -> &[LayerCache] {
        &self.layers
    }
}

impl Network {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Builds a fully connected stack over `sizes` (input width first).
    ///
    /// Every layer but the last uses `hidden`; the last uses `output`.
    ///
    /// # Errors
    ///
    /// Fails on unknown activation names, fewer than two sizes, or zero widths.
    pub fn mlp(
        registry: &ActivationRegistry,
        sizes: &[usize],
        hidden: &str,
        output: &str,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, NnError> {
        if sizes.len() < 2 {
            return Err(NnError::ShapeMismatch {
                context: "network sizes",
                expected: vec![2],
                actual: vec![sizes.len()],
            });
        }
        let hidden = registry.get(hidden)?;
        let output = registry.get(output)?;
        let mut net = Self::new();
        let last = sizes.len() - 2;
        for (i, pair) in sizes.windows(2).enumerate() {
            let activation = if i == last { output } else { hidden };
            net.push(Layer::xavier(pair[0], pair[1], activation, rng)?)?;
        }
        Ok(net)
    }

    /// Appends `layer`.
    ///
    /// # Errors
    ///
    /// [`NnError::LayerChain`] if `layer` does not accept the current output width.
    pub fn push(&mut self, layer: Layer) -> Result<(), NnError> {
        if let Some(prev) = self.layers.last() {
            if prev.out_dim() != layer.in_dim() {
                return Err(NnError::LayerChain {
                    index: self.layers.len(),
                    expected: layer.in_dim(),
                    actual: prev.out_dim(),
                });
            }
        }
        self.layers.push(layer);
        Ok(())
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Input width of the first layer, or `0` for an empty network.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::in_dim)
    }

    /// Output width of the last layer, or `0` for an empty network.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::out_dim)
    }

    /// Runs every layer front to back.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.input_size()`.
    #[must_use]
    pub fn forward(&self, x: &[f32]) -> (Vec<f32>, ForwardCache) {
        let mut out = x.to_vec();
        let mut caches = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let (y, cache) = layer.forward(&out);
            caches.push(cache);
            out = y;
        }
        (out, ForwardCache { layers: caches })
    }

    /// Forward pass that discards the cache.
    #[must_use]
    pub fn predict(&self, x: &[f32]) -> Vec<f32> {
        self.forward(x).0
    }

    /// Back-propagates `grad` (dL/d output) through the pass that produced `cache`.
    ///
    /// Returns one gradient per layer, in forward order.
    ///
    /// # Panics
    ///
    /// Panics if `cache` came from a differently shaped network.
    #[must_use]
    pub fn backward(&self, cache: &ForwardCache, grad: &[f32]) -> Vec<ParameterGradient> {
        assert_eq!(cache.layers.len(), self.layers.len(), "cache depth");
        let mut grads = Vec::with_capacity(self.layers.len());
        let mut grad_out = grad.to_vec();
        for (layer, layer_cache) in self.layers.iter().zip(&cache.layers).rev() {
            let (param_grad, grad_in) = layer.backward(layer_cache, &grad_out);
            grads.push(param_grad);
            grad_out = grad_in;
        }
        grads.reverse();
        grads
    }

    /// Zero gradients shaped like this network, for accumulation.
    #[must_use]
    pub fn zero_gradients(&self) -> Vec<ParameterGradient> {
        self.layers.iter().map(ParameterGradient::zeros_for).collect()
    }

    /// Checks that `gradients` has one entry per layer with matching shapes.
    ///
    /// # Errors
    ///
    /// [`NnError::ShapeMismatch`] naming the first disagreement.
    pub fn check_gradients<'a, I>(&self, gradients: I) -> Result<(), NnError>
    where
        I: IntoIterator<Item = &'a ParameterGradient>,
        I::IntoIter: ExactSizeIterator,
    {
        let gradients = gradients.into_iter();
        if gradients.len() != self.layers.len() {
            return Err(NnError::ShapeMismatch {
                context: "gradient count",
                expected: vec![self.layers.len()],
                actual: vec![gradients.len()],
            });
        }
        for (layer, grad) in self.layers.iter().zip(gradients) {
            if grad.d_weights.shape != layer.weights().shape {
                return Err(NnError::ShapeMismatch {
                    context: "weight gradient",
                    expected: layer.weights().shape.clone(),
                    actual: grad.d_weights.shape.clone(),
                });
            }
            if grad.d_biases.shape != layer.biases().shape {
                return Err(NnError::ShapeMismatch {
                    context: "bias gradient",
                    expected: layer.biases().shape.clone(),
                    actual: grad.d_biases.shape.clone(),
                });
            }
        }
        Ok(())
    }
}

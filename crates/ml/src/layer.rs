use crate::{Activation, NnError, Tensor};

/// A fully connected layer followed by an element-wise activation.
///
/// `forward` does not mutate the layer. Everything `backward` needs is
/// returned in a [`LayerCache`], so one layer can serve any number of
/// concurrent forward passes.
#[derive(Clone, Debug)]
pub struct Layer {
    w: Tensor,
    b: Tensor,
    in_dim: usize,
    out_dim: usize,
    activation: Activation,
}

/// Values captured by [`Layer::forward`] for the matching [`Layer::backward`].
#[derive(Clone, Debug)]
pub struct LayerCache {
    input: Vec<f32>,
    pre_activation: Vec<f32>,
}

impl LayerCache {
    #[must_use]
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    #[must_use]
    pub fn pre_activation(&self) -> &[f32] {
        &self.pre_activation
    }
}

/// Gradient of a scalar objective with respect to one layer's parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterGradient {
    pub d_weights: Tensor,
    pub d_biases: Tensor,
}

impl ParameterGradient {
    /// Zero gradient shaped like `layer`'s parameters.
    #[must_use]
    pub fn zeros_for(layer: &Layer) -> Self {
        Self {
            d_weights: layer.w.zeros_like(),
            d_biases: layer.b.zeros_like(),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.d_weights.is_zero() && self.d_biases.is_zero()
    }

    /// # Panics
    ///
    /// Panics if the two gradients belong to differently shaped layers.
    pub fn accumulate(&mut self, other: &ParameterGradient) {
        assert_eq!(self.d_weights.shape, other.d_weights.shape);
        assert_eq!(self.d_biases.shape, other.d_biases.shape);
        self.d_weights.add_assign(&other.d_weights);
        self.d_biases.add_assign(&other.d_biases);
    }

    pub fn scale(&mut self, factor: f32) {
        self.d_weights.scale(factor);
        self.d_biases.scale(factor);
    }

    pub fn clear(&mut self) {
        self.d_weights.fill(0.0);
        self.d_biases.fill(0.0);
    }
}

impl Layer {
    /// Builds a layer from row-major `[out_dim, in_dim]` weights and `out_dim` biases.
    ///
    /// # Errors
    ///
    /// [`NnError::InvalidDimensions`] for a zero-sized layer and
    /// [`NnError::ShapeMismatch`] when the buffers do not match the dimensions.
    pub fn new(
        weights: Vec<f32>,
        bias: Vec<f32>,
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
    ) -> Result<Self, NnError> {
        if in_dim == 0 || out_dim == 0 {
            return Err(NnError::InvalidDimensions { in_dim, out_dim });
        }
        if weights.len() != in_dim * out_dim {
            return Err(NnError::ShapeMismatch {
                context: "layer weights",
                expected: vec![out_dim, in_dim],
                actual: vec![weights.len()],
            });
        }
        if bias.len() != out_dim {
            return Err(NnError::ShapeMismatch {
                context: "layer biases",
                expected: vec![out_dim],
                actual: vec![bias.len()],
            });
        }
        Ok(Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights),
            b: Tensor::from_vec(vec![out_dim], bias),
            in_dim,
            out_dim,
            activation,
        })
    }

    /// Scaled-uniform initialisation: weights drawn from `±sqrt(6 / (in + out))`, zero biases.
    ///
    /// # Errors
    ///
    /// [`NnError::InvalidDimensions`] if either dimension is zero.
    pub fn xavier(
        in_dim: usize,
        out_dim: usize,
        activation: Activation,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, NnError> {
        #[allow(clippy::cast_precision_loss)]
        let limit = (6.0 / (in_dim + out_dim).max(1) as f32).sqrt();
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.f32() * 2.0 * limit - limit)
            .collect();
        Self::new(weights, vec![0.0; out_dim], in_dim, out_dim, activation)
    }

    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn weights(&self) -> &Tensor {
        &self.w
    }

    #[must_use]
    pub fn biases(&self) -> &Tensor {
        &self.b
    }

    pub(crate) fn params_mut(&mut self) -> (&mut Tensor, &mut Tensor) {
        (&mut self.w, &mut self.b)
    }

    /// `activation(W·x + b)`, plus the cache for [`Layer::backward`].
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.in_dim()`.
    #[must_use]
    pub fn forward(&self, x: &[f32]) -> (Vec<f32>, LayerCache) {
        assert_eq!(x.len(), self.in_dim, "layer input width");
        let mut z = vec![0f32; self.out_dim];
        for (o, z_o) in z.iter_mut().enumerate() {
            let row = &self.w.data[o * self.in_dim..(o + 1) * self.in_dim];
            *z_o = self.b.data[o] + row.iter().zip(x).map(|(w, x)| w * x).sum::<f32>();
        }
        let y = self.activation.apply(&z);
        (
            y,
            LayerCache {
                input: x.to_vec(),
                pre_activation: z,
            },
        )
    }

    /// Back-propagates `grad` (dL/d output) through the cached forward pass.
    ///
    /// Returns the parameter gradient and dL/d input.
    ///
    /// # Panics
    ///
    /// Panics if `grad` or `cache` do not match this layer's dimensions.
    #[must_use]
    pub fn backward(&self, cache: &LayerCache, grad: &[f32]) -> (ParameterGradient, Vec<f32>) {
        assert_eq!(grad.len(), self.out_dim, "layer output gradient width");
        assert_eq!(cache.input.len(), self.in_dim, "cached input width");
        assert_eq!(cache.pre_activation.len(), self.out_dim, "cached pre-activation width");

        let dz: Vec<f32> = self
            .activation
            .derivative(&cache.pre_activation)
            .iter()
            .zip(grad)
            .map(|(d, g)| d * g)
            .collect();

        let mut grad_input = vec![0.0; self.in_dim];
        let mut grad_w = vec![0.0; self.in_dim * self.out_dim];
        for (o, &go) in dz.iter().enumerate() {
            for i in 0..self.in_dim {
                grad_w[o * self.in_dim + i] = go * cache.input[i];
                grad_input[i] += self.w.data[o * self.in_dim + i] * go;
            }
        }
        (
            ParameterGradient {
                d_weights: Tensor::from_vec(vec![self.out_dim, self.in_dim], grad_w),
                d_biases: Tensor::from_vec(vec![self.out_dim], dz),
            },
            grad_input,
        )
    }
}

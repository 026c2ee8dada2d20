/// Row-major `f32` storage with an explicit shape.
///
/// Layers keep weights as `[out, in]` tensors and biases as `[out]` tensors;
/// gradients and optimizer moments mirror those shapes exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// # Panics
    ///
    /// Panics if `data.len()` is not the product of `shape`.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { data, shape }
    }

    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape }
    }

    #[must_use]
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// True when every element is exactly `0.0` (or `-0.0`).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// `self += other`, element-wise. Shapes must already agree.
    pub(crate) fn add_assign(&mut self, other: &Tensor) {
        debug_assert_eq!(self.shape, other.shape);
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
    }

    pub(crate) fn scale(&mut self, factor: f32) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_matches_shape() {
        let t = Tensor::zeros(vec![3, 2]);
        assert_eq!(t.len(), 6);
        assert!(t.is_zero());
    }

    #[test]
    #[should_panic]
    fn from_vec_rejects_bad_length() {
        let _ = Tensor::from_vec(vec![2, 2], vec![1.0; 3]);
    }

    #[test]
    fn negative_zero_counts_as_zero() {
        let t = Tensor::from_vec(vec![2], vec![-0.0, 0.0]);
        assert!(t.is_zero());
    }
}

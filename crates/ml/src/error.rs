use thiserror::Error;

#[derive(Error, Debug)]
pub enum NnError {
    #[error("unknown activation function `{0}`")]
    UnknownActivation(String),
    #[error("layer dimensions must be non-zero, got {in_dim} -> {out_dim}")]
    InvalidDimensions { in_dim: usize, out_dim: usize },
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("layer {index} expects {expected} inputs but the previous layer produces {actual}")]
    LayerChain {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("model file line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use ndarray::{Array4, ArrayD};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("forward pass failed: {0}")]
    Forward(String),
    #[error("model produced no outputs")]
    NoOutput,
}

/// Domain interface for a loaded network: one blob in, one score tensor out.
///
/// `&mut self` because runtime sessions keep per-run scratch state.
pub trait InferenceModel: Send {
    fn forward(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError>;
}

//! ONNX Runtime backed [`InferenceModel`].

use std::path::{Path, PathBuf};

use ndarray::{Array4, ArrayD};
use thiserror::Error;

use crate::inference::domain::inference_model::{InferenceError, InferenceModel};

use super::execution_provider::preferred_execution_providers;

#[derive(Error, Debug)]
#[error("failed to load model {path}: {message}")]
pub struct ModelLoadError {
    pub path: PathBuf,
    pub message: String,
}

pub struct OnnxModel {
    session: ort::session::Session,
    name: String,
}

impl OnnxModel {
    /// Builds a session for `model_path` on the platform's preferred provider.
    pub fn load(model_path: &Path) -> Result<Self, ModelLoadError> {
        let fail = |message: String| ModelLoadError {
            path: model_path.to_path_buf(),
            message,
        };

        let session = ort::session::Session::builder()
            .map_err(|e| fail(e.to_string()))?
            .with_execution_providers(preferred_execution_providers())
            .map_err(|e| fail(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| fail(e.to_string()))?;

        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("Loaded model {name} from {}", model_path.display());

        Ok(Self { session, name })
    }
}

impl InferenceModel for OnnxModel {
    fn forward(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
        let name = &self.name;
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|e| InferenceError::Forward(format!("{name}: {e}")))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| InferenceError::Forward(format!("{name}: {e}")))?;
        if outputs.len() == 0 {
            return Err(InferenceError::NoOutput);
        }
        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::Forward(format!("{name}: {e}")))?;
        Ok(scores.to_owned())
    }
}

use thiserror::Error;

use crate::inference::domain::inference_model::InferenceError;
use crate::shared::blob::BlobError;
use crate::shared::config::Threshold;
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocalizeError {
    #[error("cannot prepare frame for detection: {0}")]
    Blob(#[from] BlobError),
    #[error("detector inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("malformed detector output: expected [1, 1, N, 7], got {shape:?}")]
    MalformedOutput { shape: Vec<usize> },
}

/// Candidates found in one frame, plus a copy of the frame with a box
/// drawn around each of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Localization {
    pub candidates: Vec<Rect>,
    pub annotated: Frame,
}

impl Localization {
    /// Fallback used when detection fails: no candidates, frame untouched.
    pub fn passthrough(frame: &Frame) -> Self {
        Self {
            candidates: Vec::new(),
            annotated: frame.clone(),
        }
    }
}

/// Domain interface for face localization.
///
/// `&mut self` because inference sessions are mutated by each run.
pub trait FaceDetector: Send {
    fn detect_faces(
        &mut self,
        frame: &Frame,
        threshold: Threshold,
    ) -> Result<Localization, LocalizeError>;
}

use crate::classification::domain::attribute_classifier::ClassifyError;
use crate::classification::domain::labels::{AgeBracket, Gender};
use crate::detection::domain::face_detector::LocalizeError;
use crate::shared::rect::Rect;

pub const NO_FACE_STATUS: &str = "No face detected";

/// One classified face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceResult {
    /// Candidate rectangle as reported by the detector.
    pub rect: Rect,
    /// Padded, clamped region the classifier saw.
    pub crop: Rect,
    pub gender: Gender,
    pub age: AgeBracket,
}

impl FaceResult {
    /// Status line, with the bracket's parentheses stripped.
    pub fn status_line(&self) -> String {
        format!("Gender: {}, Age: {} years", self.gender, self.age.range())
    }

    /// Text drawn above the face, bracket parentheses kept.
    pub fn frame_label(&self) -> String {
        format!("{}, {}", self.gender, self.age)
    }
}

/// A candidate that produced no labels.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedCandidate {
    pub rect: Rect,
    pub reason: ClassifyError,
}

/// What happened to one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame_index: usize,
    /// Candidates that passed the confidence threshold.
    pub candidates: usize,
    pub faces: Vec<FaceResult>,
    pub skipped: Vec<SkippedCandidate>,
    pub detector_error: Option<LocalizeError>,
}

impl FrameReport {
    pub fn new(frame_index: usize) -> Self {
        Self {
            frame_index,
            candidates: 0,
            faces: Vec::new(),
            skipped: Vec::new(),
            detector_error: None,
        }
    }

    /// True when the detector produced no candidates, including when it failed.
    pub fn no_face(&self) -> bool {
        self.candidates == 0
    }

    /// One line per classified face, or the no-face line.
    pub fn status_lines(&self) -> Vec<String> {
        if self.no_face() {
            return vec![NO_FACE_STATUS.to_string()];
        }
        self.faces.iter().map(FaceResult::status_line).collect()
    }
}

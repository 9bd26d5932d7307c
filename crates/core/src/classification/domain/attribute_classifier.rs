use thiserror::Error;

use crate::classification::domain::labels::{AgeBracket, Category, ClassPrediction, Gender};
use crate::inference::domain::inference_model::{InferenceError, InferenceModel};
use crate::shared::blob::{BlobError, BlobParams};
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("degenerate crop ({width}x{height})")]
    DegenerateCrop { width: u32, height: u32 },
    #[error("crop has {0} channels, expected 3")]
    UnsupportedChannels(u8),
    #[error("{pass} inference failed: {source}")]
    Inference {
        pass: &'static str,
        #[source]
        source: InferenceError,
    },
    #[error("{pass} model returned {got} scores for {expected} classes")]
    ScoreMismatch {
        pass: &'static str,
        got: usize,
        expected: usize,
    },
}

impl From<BlobError> for ClassifyError {
    fn from(e: BlobError) -> Self {
        match e {
            BlobError::EmptyFrame { width, height } => ClassifyError::DegenerateCrop { width, height },
            BlobError::UnsupportedChannels(c) => ClassifyError::UnsupportedChannels(c),
        }
    }
}

/// Gender and age predictions for one face crop.
#[derive(Clone, Debug, PartialEq)]
pub struct Attributes {
    pub gender: ClassPrediction<Gender>,
    pub age: ClassPrediction<AgeBracket>,
}

/// Runs the gender and age networks over face crops.
///
/// Both passes share one blob; they are independent of each other.
pub struct AttributeClassifier {
    age_model: Box<dyn InferenceModel>,
    gender_model: Box<dyn InferenceModel>,
    blob: BlobParams,
}

impl AttributeClassifier {
    pub fn new(
        age_model: Box<dyn InferenceModel>,
        gender_model: Box<dyn InferenceModel>,
        blob: BlobParams,
    ) -> Self {
        Self {
            age_model,
            gender_model,
            blob,
        }
    }

    pub fn classify(&mut self, crop: &Frame) -> Result<Attributes, ClassifyError> {
        let input = self.blob.to_blob(crop)?;

        let gender = predict::<Gender>("gender", self.gender_model.as_mut(), input.clone())?;
        let age = predict::<AgeBracket>("age", self.age_model.as_mut(), input)?;

        Ok(Attributes { gender, age })
    }

    /// Label-only view of [`classify`](Self::classify): any failure,
    /// including a degenerate crop, yields `(None, None)`.
    pub fn classify_labels(&mut self, crop: &Frame) -> (Option<Gender>, Option<AgeBracket>) {
        match self.classify(crop) {
            Ok(attrs) => (Some(attrs.gender.label), Some(attrs.age.label)),
            Err(_) => (None, None),
        }
    }
}

fn predict<L: Category>(
    pass: &'static str,
    model: &mut dyn InferenceModel,
    input: ndarray::Array4<f32>,
) -> Result<ClassPrediction<L>, ClassifyError> {
    let output = model
        .forward(input)
        .map_err(|source| ClassifyError::Inference { pass, source })?;
    // Output is [1, classes] (sometimes [1, classes, 1, 1]); flatten.
    let scores: Vec<f32> = output.iter().copied().collect();
    let got = scores.len();
    let prediction = ClassPrediction::from_scores(scores).ok_or(ClassifyError::ScoreMismatch {
        pass,
        got,
        expected: L::ALL.len(),
    })?;
    log::debug!(
        "{pass}: {} ({:.2})",
        prediction.label,
        prediction.confidence()
    );
    Ok(prediction)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::{Array4, ArrayD, IxDyn};
    use std::sync::{Arc, Mutex};

    /// Returns a fixed score vector and records the input shapes it saw.
    pub(crate) struct StubScores {
        pub scores: Vec<f32>,
        pub calls: Arc<Mutex<Vec<Vec<usize>>>>,
    }

    impl StubScores {
        pub(crate) fn new(scores: Vec<f32>) -> Self {
            Self {
                scores,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl InferenceModel for StubScores {
        fn forward(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
            self.calls.lock().unwrap().push(input.shape().to_vec());
            Ok(ArrayD::from_shape_vec(IxDyn(&[1, self.scores.len()]), self.scores.clone()).unwrap())
        }
    }

    pub(crate) struct FailingModel;

    impl InferenceModel for FailingModel {
        fn forward(&mut self, _input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
            Err(InferenceError::Forward("boom".into()))
        }
    }

    fn age_scores(hot: usize) -> Vec<f32> {
        (0..8).map(|i| if i == hot { 0.8 } else { 0.02 }).collect()
    }

    fn crop(w: u32, h: u32) -> Frame {
        Frame::new(vec![90; (w * h * 3) as usize], w, h, 3, 0)
    }

    fn classifier(age: Vec<f32>, gender: Vec<f32>) -> AttributeClassifier {
        AttributeClassifier::new(
            Box::new(StubScores::new(age)),
            Box::new(StubScores::new(gender)),
            BlobParams::classifier(),
        )
    }

    #[test]
    fn test_classify_maps_argmax_to_labels() {
        let mut c = classifier(age_scores(3), vec![0.1, 0.9]);
        let attrs = c.classify(&crop(64, 80)).unwrap();
        assert_eq!(attrs.gender.label, Gender::Female);
        assert_eq!(attrs.age.label, AgeBracket::Teen);
        assert_eq!(attrs.age.scores.len(), 8);
    }

    #[test]
    fn test_every_age_index_maps_positionally() {
        for hot in 0..8 {
            let mut c = classifier(age_scores(hot), vec![0.9, 0.1]);
            let (gender, age) = c.classify_labels(&crop(30, 30));
            assert_eq!(gender, Some(Gender::Male));
            assert_eq!(age, Some(AgeBracket::ALL[hot]));
        }
    }

    #[test]
    fn test_both_passes_receive_227_blob() {
        let age = StubScores::new(age_scores(0));
        let gender = StubScores::new(vec![0.5, 0.4]);
        let (age_calls, gender_calls) = (age.calls.clone(), gender.calls.clone());
        let mut c = AttributeClassifier::new(Box::new(age), Box::new(gender), BlobParams::classifier());
        c.classify(&crop(41, 17)).unwrap();
        assert_eq!(age_calls.lock().unwrap().as_slice(), &[vec![1, 3, 227, 227]]);
        assert_eq!(gender_calls.lock().unwrap().as_slice(), &[vec![1, 3, 227, 227]]);
    }

    #[test]
    fn test_zero_area_crop_yields_none() {
        let mut c = classifier(age_scores(0), vec![0.5, 0.4]);
        let empty = Frame::new(Vec::new(), 0, 40, 3, 0);
        assert_eq!(c.classify_labels(&empty), (None, None));
        assert_eq!(
            c.classify(&empty),
            Err(ClassifyError::DegenerateCrop {
                width: 0,
                height: 40
            })
        );
    }

    #[test]
    fn test_wrong_channel_count_yields_none() {
        let mut c = classifier(age_scores(0), vec![0.5, 0.4]);
        let gray = Frame::new(vec![0; 100], 10, 10, 1, 0);
        assert_eq!(c.classify(&gray), Err(ClassifyError::UnsupportedChannels(1)));
        assert_eq!(c.classify_labels(&gray), (None, None));
    }

    #[test]
    fn test_inference_failure_yields_none() {
        let mut c = AttributeClassifier::new(
            Box::new(StubScores::new(age_scores(2))),
            Box::new(FailingModel),
            BlobParams::classifier(),
        );
        assert!(matches!(
            c.classify(&crop(20, 20)),
            Err(ClassifyError::Inference { pass: "gender", .. })
        ));
        assert_eq!(c.classify_labels(&crop(20, 20)), (None, None));
    }

    #[test]
    fn test_wrong_score_length_is_reported() {
        let mut c = classifier(vec![0.5; 5], vec![0.5, 0.4]);
        assert_eq!(
            c.classify(&crop(20, 20)),
            Err(ClassifyError::ScoreMismatch {
                pass: "age",
                got: 5,
                expected: 8
            })
        );
    }
}

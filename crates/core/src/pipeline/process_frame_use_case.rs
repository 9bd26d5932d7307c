use std::time::Instant;

use crate::classification::domain::attribute_classifier::AttributeClassifier;
use crate::detection::domain::face_detector::{FaceDetector, Localization};
use crate::pipeline::frame_report::{FaceResult, FrameReport, SkippedCandidate};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::overlay::{Overlay, LABEL_SCALE};
use crate::shared::config::SessionConfig;
use crate::shared::constants::{LABEL_COLOR, LABEL_OFFSET_Y};
use crate::shared::frame::Frame;

/// Per-frame pipeline: localize → pad/crop → classify → annotate.
///
/// Never fails: detector errors degrade to a pass-through frame and
/// classifier errors skip the candidate. Both are recorded in the report.
pub struct ProcessFrameUseCase {
    detector: Box<dyn FaceDetector>,
    classifier: AttributeClassifier,
    config: SessionConfig,
}

impl ProcessFrameUseCase {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        classifier: AttributeClassifier,
        config: SessionConfig,
    ) -> Self {
        Self {
            detector,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the annotated frame and what happened to each candidate.
    pub fn execute(
        &mut self,
        frame: &Frame,
        logger: &mut dyn PipelineLogger,
    ) -> (Frame, FrameReport) {
        let mut report = FrameReport::new(frame.index());

        let t0 = Instant::now();
        let localization = match self.detector.detect_faces(frame, self.config.threshold) {
            Ok(localization) => localization,
            Err(e) => {
                log::warn!("frame {}: face detection failed: {e}", frame.index());
                report.detector_error = Some(e);
                Localization::passthrough(frame)
            }
        };
        logger.timing("detect", t0.elapsed().as_secs_f64() * 1000.0);

        report.candidates = localization.candidates.len();
        if localization.candidates.is_empty() {
            return (localization.annotated, report);
        }

        let t1 = Instant::now();
        for rect in &localization.candidates {
            let crop_rect = rect.pad_and_clamp(self.config.padding, frame.width(), frame.height());
            let crop = frame.crop(&crop_rect);
            match self.classifier.classify(&crop) {
                Ok(attrs) => report.faces.push(FaceResult {
                    rect: *rect,
                    crop: crop_rect,
                    gender: attrs.gender.label,
                    age: attrs.age.label,
                }),
                Err(reason) => {
                    log::debug!("frame {}: skipping candidate {rect:?}: {reason}", frame.index());
                    report.skipped.push(SkippedCandidate {
                        rect: *rect,
                        reason,
                    });
                }
            }
        }
        logger.timing("classify", t1.elapsed().as_secs_f64() * 1000.0);

        let annotated = if report.faces.is_empty() {
            localization.annotated
        } else {
            draw_labels(localization.annotated, &report.faces)
        };
        (annotated, report)
    }
}

fn draw_labels(annotated: Frame, faces: &[FaceResult]) -> Frame {
    let Some(mut overlay) = Overlay::from_frame(&annotated) else {
        return annotated;
    };
    for face in faces {
        overlay.draw_label(
            face.rect.x1,
            face.rect.y1 - LABEL_OFFSET_Y,
            &face.frame_label(),
            LABEL_COLOR,
            LABEL_SCALE,
        );
    }
    overlay.into_frame()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classification::domain::attribute_classifier::tests::{FailingModel, StubScores};
    use crate::classification::domain::attribute_classifier::ClassifyError;
    use crate::classification::domain::labels::{AgeBracket, Gender};
    use crate::detection::domain::face_detector::LocalizeError;
    use crate::inference::domain::inference_model::{InferenceError, InferenceModel};
    use crate::pipeline::pipeline_logger::tests::RecordingLogger;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::blob::BlobParams;
    use crate::shared::config::Threshold;
    use crate::shared::constants::BOX_COLOR;
    use crate::shared::rect::Rect;
    use ndarray::{Array4, ArrayD, IxDyn};
    use std::sync::{Arc, Mutex};

    /// Returns fixed `(confidence, rect)` pairs, filtered by threshold,
    /// and records the thresholds it was called with.
    pub(crate) struct StubDetector {
        pub detections: Vec<(f32, Rect)>,
        pub thresholds: Arc<Mutex<Vec<f64>>>,
    }

    impl StubDetector {
        pub(crate) fn new(detections: Vec<(f32, Rect)>) -> Self {
            Self {
                detections,
                thresholds: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl FaceDetector for StubDetector {
        fn detect_faces(
            &mut self,
            frame: &Frame,
            threshold: Threshold,
        ) -> Result<Localization, LocalizeError> {
            self.thresholds.lock().unwrap().push(threshold.value());
            let candidates = self
                .detections
                .iter()
                .filter(|(c, _)| threshold.accepts(*c as f64))
                .map(|(_, r)| *r)
                .collect();
            Ok(Localization {
                candidates,
                annotated: frame.clone(),
            })
        }
    }

    pub(crate) struct BrokenDetector;

    impl FaceDetector for BrokenDetector {
        fn detect_faces(
            &mut self,
            _frame: &Frame,
            _threshold: Threshold,
        ) -> Result<Localization, LocalizeError> {
            Err(LocalizeError::Inference(InferenceError::NoOutput))
        }
    }

    /// Classifier that always answers Male, (20-25).
    pub(crate) fn male_young_adult() -> AttributeClassifier {
        let mut age = vec![0.01; 8];
        age[4] = 0.9;
        AttributeClassifier::new(
            Box::new(StubScores::new(age)),
            Box::new(StubScores::new(vec![0.8, 0.2])),
            BlobParams::classifier(),
        )
    }

    pub(crate) fn gray(w: u32, h: u32, index: usize) -> Frame {
        Frame::new(vec![60; (w * h * 3) as usize], w, h, 3, index)
    }

    fn use_case(detector: Box<dyn FaceDetector>, classifier: AttributeClassifier) -> ProcessFrameUseCase {
        ProcessFrameUseCase::new(detector, classifier, SessionConfig::default())
    }

    #[test]
    fn test_no_face_returns_unmodified_frame() {
        let mut uc = use_case(Box::new(StubDetector::new(vec![])), male_young_adult());
        let frame = gray(120, 90, 4);
        let (annotated, report) = uc.execute(&frame, &mut NullPipelineLogger);
        assert_eq!(annotated, frame);
        assert!(report.no_face());
        assert_eq!(report.frame_index, 4);
        assert_eq!(report.status_lines(), vec!["No face detected"]);
    }

    #[test]
    fn test_single_confident_face_is_labelled() {
        let rect = Rect::new(40, 50, 100, 120);
        let detector = StubDetector::new(vec![(0.95, rect)]);
        let mut uc = use_case(Box::new(detector), male_young_adult());
        let frame = gray(200, 160, 0);

        let (annotated, report) = uc.execute(&frame, &mut NullPipelineLogger);

        assert_eq!(report.candidates, 1);
        assert_eq!(report.faces.len(), 1);
        assert_eq!(report.faces[0].gender, Gender::Male);
        assert_eq!(report.faces[0].age, AgeBracket::YoungAdult);
        assert_eq!(report.status_lines(), vec!["Gender: Male, Age: 20-25 years"]);

        // The first glyph ('M') lights its top-left cell; the label's
        // bottom edge sits 10px above the box.
        let px = annotated.as_ndarray();
        let top = (rect.y1 - LABEL_OFFSET_Y) as usize - 7 * LABEL_SCALE as usize;
        let x = rect.x1 as usize;
        assert_eq!([px[[top, x, 0]], px[[top, x, 1]], px[[top, x, 2]]], LABEL_COLOR);
        assert_ne!(annotated, frame);
    }

    #[test]
    fn test_crop_uses_configured_padding() {
        let detector = StubDetector::new(vec![(0.9, Rect::new(5, 5, 50, 50))]);
        let mut uc = use_case(Box::new(detector), male_young_adult());
        let (_, report) = uc.execute(&gray(40, 40, 0), &mut NullPipelineLogger);
        assert_eq!(report.faces[0].crop, Rect::new(0, 0, 39, 39));
        assert_eq!(report.faces[0].rect, Rect::new(5, 5, 50, 50));
    }

    #[test]
    fn test_threshold_is_forwarded_to_detector() {
        let detector = StubDetector::new(vec![(0.8, Rect::new(0, 0, 10, 10))]);
        let seen = detector.thresholds.clone();
        let config = SessionConfig::new(0.85, 0).unwrap();
        let mut uc = ProcessFrameUseCase::new(Box::new(detector), male_young_adult(), config);
        let (_, report) = uc.execute(&gray(20, 20, 0), &mut NullPipelineLogger);
        assert_eq!(seen.lock().unwrap().as_slice(), &[0.85]);
        assert!(report.no_face());
    }

    #[test]
    fn test_detector_failure_passes_frame_through() {
        let mut uc = use_case(Box::new(BrokenDetector), male_young_adult());
        let frame = gray(64, 48, 9);
        let (annotated, report) = uc.execute(&frame, &mut NullPipelineLogger);
        assert_eq!(annotated, frame);
        assert!(report.detector_error.is_some());
        assert_eq!(report.status_lines(), vec!["No face detected"]);
    }

    #[test]
    fn test_classifier_failure_skips_candidate_only() {
        let detector = StubDetector::new(vec![(0.9, Rect::new(2, 2, 20, 20))]);
        let classifier = AttributeClassifier::new(
            Box::new(FailingModel),
            Box::new(StubScores::new(vec![0.5, 0.5])),
            BlobParams::classifier(),
        );
        let mut uc = use_case(Box::new(detector), classifier);
        let frame = gray(50, 50, 0);
        let (annotated, report) = uc.execute(&frame, &mut NullPipelineLogger);

        assert_eq!(report.candidates, 1);
        assert!(report.faces.is_empty());
        assert!(matches!(
            report.skipped[0].reason,
            ClassifyError::Inference { pass: "age", .. }
        ));
        assert!(report.status_lines().is_empty());
        assert_eq!(annotated, frame);
    }

    #[test]
    fn test_degenerate_candidate_is_skipped_and_others_kept() {
        let detector = StubDetector::new(vec![
            (0.9, Rect::new(30, 30, 30, 30)),
            (0.9, Rect::new(5, 5, 25, 25)),
        ]);
        let config = SessionConfig::new(0.7, 0).unwrap();
        let mut uc = ProcessFrameUseCase::new(Box::new(detector), male_young_adult(), config);
        let (_, report) = uc.execute(&gray(40, 40, 0), &mut NullPipelineLogger);

        assert_eq!(report.candidates, 2);
        assert_eq!(report.faces.len(), 1);
        assert_eq!(report.faces[0].rect, Rect::new(5, 5, 25, 25));
        assert!(matches!(
            report.skipped[0].reason,
            ClassifyError::DegenerateCrop { .. }
        ));
    }

    #[test]
    fn test_crop_comes_from_original_frame_not_annotated_copy() {
        /// Draws a box like the real localizer does.
        struct BoxingDetector;
        impl FaceDetector for BoxingDetector {
            fn detect_faces(
                &mut self,
                frame: &Frame,
                _threshold: Threshold,
            ) -> Result<Localization, LocalizeError> {
                let rect = Rect::new(0, 0, 9, 9);
                let mut overlay = Overlay::from_frame(frame).unwrap();
                overlay.draw_box(&rect, BOX_COLOR, 1);
                Ok(Localization {
                    candidates: vec![rect],
                    annotated: overlay.into_frame(),
                })
            }
        }

        /// Records every blob it is given.
        struct CapturingModel {
            scores: Vec<f32>,
            inputs: Arc<Mutex<Vec<Array4<f32>>>>,
        }
        impl InferenceModel for CapturingModel {
            fn forward(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
                self.inputs.lock().unwrap().push(input);
                Ok(ArrayD::from_shape_vec(IxDyn(&[1, self.scores.len()]), self.scores.clone()).unwrap())
            }
        }

        let inputs = Arc::new(Mutex::new(Vec::new()));
        let gender = CapturingModel {
            scores: vec![0.1, 0.9],
            inputs: inputs.clone(),
        };
        let age = StubScores::new(vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let classifier =
            AttributeClassifier::new(Box::new(age), Box::new(gender), BlobParams::classifier());
        let config = SessionConfig::new(0.5, 0).unwrap();
        let mut uc = ProcessFrameUseCase::new(Box::new(BoxingDetector), classifier, config);
        let frame = gray(20, 20, 0);
        let (_, report) = uc.execute(&frame, &mut NullPipelineLogger);

        assert_eq!(report.faces.len(), 1);
        let expected = BlobParams::classifier()
            .to_blob(&frame.crop(&report.faces[0].crop))
            .unwrap();
        assert_eq!(inputs.lock().unwrap().as_slice(), &[expected]);
    }

    #[test]
    fn test_records_stage_timings() {
        let logger = RecordingLogger::default();
        let stages = logger.stages.clone();
        let detector = StubDetector::new(vec![(0.9, Rect::new(2, 2, 20, 20))]);
        let mut uc = use_case(Box::new(detector), male_young_adult());
        let mut boxed: Box<dyn PipelineLogger> = Box::new(logger);
        uc.execute(&gray(30, 30, 0), boxed.as_mut());
        assert_eq!(stages.lock().unwrap().as_slice(), &["detect", "classify"]);
    }
}

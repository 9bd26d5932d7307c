use crate::detection::domain::detection::{decode_ssd_output, filter_candidates};
use crate::detection::domain::face_detector::{FaceDetector, LocalizeError, Localization};
use crate::inference::domain::inference_model::InferenceModel;
use crate::rendering::overlay::{box_thickness, Overlay};
use crate::shared::blob::BlobParams;
use crate::shared::config::Threshold;
use crate::shared::constants::BOX_COLOR;
use crate::shared::frame::Frame;

/// SSD face localizer: one forward pass per frame over a fixed-size blob.
pub struct FaceLocalizer {
    model: Box<dyn InferenceModel>,
    blob: BlobParams,
}

impl FaceLocalizer {
    pub fn new(model: Box<dyn InferenceModel>, blob: BlobParams) -> Self {
        Self { model, blob }
    }
}

impl FaceDetector for FaceLocalizer {
    fn detect_faces(
        &mut self,
        frame: &Frame,
        threshold: Threshold,
    ) -> Result<Localization, LocalizeError> {
        let input = self.blob.to_blob(frame)?;
        let output = self.model.forward(input)?;
        let detections = decode_ssd_output(&output, frame.width(), frame.height())?;
        let candidates: Vec<_> = filter_candidates(&detections, threshold)
            .into_iter()
            .map(|d| d.rect)
            .collect();

        let annotated = match Overlay::from_frame(frame) {
            Some(mut overlay) => {
                let thickness = box_thickness(frame.height());
                for rect in &candidates {
                    overlay.draw_box(rect, BOX_COLOR, thickness);
                }
                overlay.into_frame()
            }
            None => frame.clone(),
        };

        Ok(Localization {
            candidates,
            annotated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection::tests::ssd_tensor;
    use crate::inference::domain::inference_model::InferenceError;
    use crate::shared::rect::Rect;
    use ndarray::{Array4, ArrayD};
    use std::sync::{Arc, Mutex};

    struct StubDetectorModel {
        output: ArrayD<f32>,
        shapes: Arc<Mutex<Vec<Vec<usize>>>>,
    }

    impl InferenceModel for StubDetectorModel {
        fn forward(&mut self, input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
            self.shapes.lock().unwrap().push(input.shape().to_vec());
            Ok(self.output.clone())
        }
    }

    struct CrashingModel;

    impl InferenceModel for CrashingModel {
        fn forward(&mut self, _input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
            Err(InferenceError::Forward("session aborted".into()))
        }
    }

    fn localizer(rows: &[(f32, f32, f32, f32, f32)]) -> (FaceLocalizer, Arc<Mutex<Vec<Vec<usize>>>>) {
        let shapes = Arc::new(Mutex::new(Vec::new()));
        let model = StubDetectorModel {
            output: ssd_tensor(rows),
            shapes: shapes.clone(),
        };
        (FaceLocalizer::new(Box::new(model), BlobParams::detector()), shapes)
    }

    fn gray(w: u32, h: u32) -> Frame {
        Frame::new(vec![100; (w * h * 3) as usize], w, h, 3, 0)
    }

    fn t(v: f64) -> Threshold {
        Threshold::new(v).unwrap()
    }

    #[test]
    fn test_runs_one_pass_on_300_blob() {
        let (mut loc, shapes) = localizer(&[]);
        loc.detect_faces(&gray(640, 480), t(0.7)).unwrap();
        assert_eq!(shapes.lock().unwrap().as_slice(), &[vec![1, 3, 300, 300]]);
    }

    #[test]
    fn test_single_confident_face() {
        let (mut loc, _) = localizer(&[(0.95, 0.25, 0.25, 0.5, 0.75)]);
        let result = loc.detect_faces(&gray(400, 200), t(0.7)).unwrap();
        assert_eq!(result.candidates, vec![Rect::new(100, 50, 200, 150)]);
        let px = result.annotated.as_ndarray();
        assert_eq!([px[[50, 150, 0]], px[[50, 150, 1]], px[[50, 150, 2]]], BOX_COLOR);
    }

    #[test]
    fn test_no_candidates_leaves_frame_untouched() {
        let (mut loc, _) = localizer(&[(0.4, 0.1, 0.1, 0.3, 0.3)]);
        let frame = gray(100, 100);
        let result = loc.detect_faces(&frame, t(0.7)).unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.annotated, frame);
    }

    #[test]
    fn test_keeps_emission_order() {
        let (mut loc, _) = localizer(&[
            (0.75, 0.5, 0.5, 0.75, 0.75),
            (0.99, 0.125, 0.125, 0.25, 0.25),
        ]);
        let result = loc.detect_faces(&gray(80, 80), t(0.7)).unwrap();
        assert_eq!(
            result.candidates,
            vec![Rect::new(40, 40, 60, 60), Rect::new(10, 10, 20, 20)]
        );
    }

    #[test]
    fn test_threshold_monotonicity_on_same_frame() {
        let rows = [
            (0.72, 0.0, 0.0, 0.1, 0.1),
            (0.91, 0.2, 0.2, 0.3, 0.3),
            (0.5, 0.4, 0.4, 0.5, 0.5),
            (0.99, 0.6, 0.6, 0.7, 0.7),
        ];
        let frame = gray(100, 100);
        let (mut loc, _) = localizer(&rows);
        let low = loc.detect_faces(&frame, t(0.6)).unwrap().candidates;
        let high = loc.detect_faces(&frame, t(0.9)).unwrap().candidates;
        assert_eq!(low.len(), 3);
        assert_eq!(high.len(), 2);
        assert!(high.iter().all(|r| low.contains(r)));
    }

    #[test]
    fn test_inference_failure_is_reported() {
        let mut loc = FaceLocalizer::new(Box::new(CrashingModel), BlobParams::detector());
        let err = loc.detect_faces(&gray(50, 50), t(0.7)).unwrap_err();
        assert!(matches!(err, LocalizeError::Inference(_)));
    }

    #[test]
    fn test_malformed_output_is_reported() {
        let shapes = Arc::new(Mutex::new(Vec::new()));
        let model = StubDetectorModel {
            output: ArrayD::zeros(ndarray::IxDyn(&[1, 5])),
            shapes,
        };
        let mut loc = FaceLocalizer::new(Box::new(model), BlobParams::detector());
        let err = loc.detect_faces(&gray(50, 50), t(0.7)).unwrap_err();
        assert!(matches!(err, LocalizeError::MalformedOutput { .. }));
    }

    #[test]
    fn test_empty_frame_is_reported() {
        let (mut loc, shapes) = localizer(&[]);
        let err = loc.detect_faces(&Frame::new(Vec::new(), 0, 0, 3, 0), t(0.7)).unwrap_err();
        assert!(matches!(err, LocalizeError::Blob(_)));
        assert!(shapes.lock().unwrap().is_empty());
    }
}

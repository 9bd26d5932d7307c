use ndarray::ArrayD;

use crate::detection::domain::face_detector::LocalizeError;
use crate::shared::config::Threshold;
use crate::shared::rect::Rect;

/// Values per row of the SSD detector output:
/// `[image_id, class_id, confidence, x1, y1, x2, y2]`.
pub const SSD_ROW_LEN: usize = 7;

/// A scored face region, before or after threshold filtering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub confidence: f32,
    pub rect: Rect,
}

/// Decodes an SSD `[1, 1, N, 7]` tensor into pixel-space detections.
///
/// Normalized corners are scaled by the frame size and truncated toward
/// zero. Rows keep the order the network emitted them in.
pub fn decode_ssd_output(
    output: &ArrayD<f32>,
    frame_width: u32,
    frame_height: u32,
) -> Result<Vec<Detection>, LocalizeError> {
    let shape = output.shape();
    if shape.len() != 4 || shape[3] != SSD_ROW_LEN {
        return Err(LocalizeError::MalformedOutput {
            shape: shape.to_vec(),
        });
    }

    let fw = frame_width as f32;
    let fh = frame_height as f32;
    let values: Vec<f32> = output.iter().copied().collect();
    let detections = values
        .chunks_exact(SSD_ROW_LEN)
        .map(|row| Detection {
            confidence: row[2],
            rect: Rect::new(
                (row[3] * fw) as i32,
                (row[4] * fh) as i32,
                (row[5] * fw) as i32,
                (row[6] * fh) as i32,
            ),
        })
        .collect();
    Ok(detections)
}

/// Keeps detections scoring strictly above `threshold`, in input order.
pub fn filter_candidates(detections: &[Detection], threshold: Threshold) -> Vec<Detection> {
    detections
        .iter()
        .filter(|d| threshold.accepts(d.confidence as f64))
        .copied()
        .collect()
}

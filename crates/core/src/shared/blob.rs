//! Conversion of frames into the NCHW `f32` blobs the inference models expect.

use ndarray::Array4;
use thiserror::Error;

use crate::shared::constants::{
    CLASSIFIER_INPUT_SIZE, CLASSIFIER_MEAN, DETECTOR_INPUT_SIZE, DETECTOR_MEAN,
};
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error("cannot build a blob from an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },
    #[error("expected a 3-channel frame, got {0} channels")]
    UnsupportedChannels(u8),
}

/// Channel order of the blob. Frames are always RGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Model-specific normalization constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobParams {
    pub size: u32,
    /// Subtracted per channel, in `order`.
    pub mean: [f32; 3],
    pub scale: f32,
    pub order: ChannelOrder,
}

impl BlobParams {
    pub fn detector() -> Self {
        Self {
            size: DETECTOR_INPUT_SIZE,
            mean: DETECTOR_MEAN,
            scale: 1.0,
            order: ChannelOrder::Rgb,
        }
    }

    pub fn classifier() -> Self {
        Self {
            size: CLASSIFIER_INPUT_SIZE,
            mean: CLASSIFIER_MEAN,
            scale: 1.0,
            order: ChannelOrder::Bgr,
        }
    }

    /// Bilinear resize to `size × size` (aspect ratio is not kept), then
    /// `(pixel - mean) * scale` into a `[1, 3, size, size]` tensor.
    ///
    /// Each output pixel reads only its 2×2 source neighbourhood with
    /// half-pixel centres, and is rounded to 8 bits before normalization.
    pub fn to_blob(&self, frame: &Frame) -> Result<Array4<f32>, BlobError> {
        if frame.is_empty() {
            return Err(BlobError::EmptyFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }
        if frame.channels() != 3 {
            return Err(BlobError::UnsupportedChannels(frame.channels()));
        }

        let s = self.size as usize;
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        let data = frame.data();
        let sample = |x: usize, y: usize, c: usize| data[(y * w + x) * 3 + c] as f32;

        let mut tensor = Array4::<f32>::zeros((1, 3, s, s));
        for y in 0..s {
            let (y0, y1, fy) = source_taps(y, h, s);
            for x in 0..s {
                let (x0, x1, fx) = source_taps(x, w, s);
                for c in 0..3 {
                    let src_c = match self.order {
                        ChannelOrder::Rgb => c,
                        ChannelOrder::Bgr => 2 - c,
                    };
                    let value = sample(x0, y0, src_c) * (1.0 - fx) * (1.0 - fy)
                        + sample(x1, y0, src_c) * fx * (1.0 - fy)
                        + sample(x0, y1, src_c) * (1.0 - fx) * fy
                        + sample(x1, y1, src_c) * fx * fy;
                    let value = value.round().clamp(0.0, 255.0);
                    tensor[[0, c, y, x]] = (value - self.mean[c]) * self.scale;
                }
            }
        }
        Ok(tensor)
    }
}

/// Maps output index `dst` onto its two source neighbours and the weight
/// of the second one.
fn source_taps(dst: usize, src_len: usize, dst_len: usize) -> (usize, usize, f32) {
    let scale = src_len as f32 / dst_len as f32;
    let src = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
    let i0 = (src.floor() as usize).min(src_len - 1);
    let i1 = (i0 + 1).min(src_len - 1);
    (i0, i1, src - i0 as f32)
}

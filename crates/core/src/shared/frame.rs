use image::RgbImage;
use ndarray::{s, ArrayView3};

use crate::shared::rect::Rect;

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Wraps an `RgbImage`, taking ownership of its buffer.
    pub fn from_rgb_image(img: RgbImage, index: usize) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the half-open window `[y1, y2) × [x1, x2)` into a new frame.
    ///
    /// Coordinates beyond the frame are clipped. A degenerate window yields
    /// an empty frame rather than an error; callers decide what that means.
    pub fn crop(&self, rect: &Rect) -> Frame {
        let x1 = (rect.x1.max(0) as u32).min(self.width);
        let y1 = (rect.y1.max(0) as u32).min(self.height);
        let x2 = (rect.x2.max(0) as u32).clamp(x1, self.width);
        let y2 = (rect.y2.max(0) as u32).clamp(y1, self.height);

        let (w, h) = (x2 - x1, y2 - y1);
        if w == 0 || h == 0 {
            return Frame::new(Vec::new(), w, h, self.channels, self.index);
        }

        let window = self.as_ndarray();
        let window = window.slice(s![
            y1 as usize..y2 as usize,
            x1 as usize..x2 as usize,
            ..
        ]);
        let data: Vec<u8> = window.iter().copied().collect();
        Frame::new(data, w, h, self.channels, self.index)
    }

    /// Copies the pixels into an `RgbImage` for drawing and encoding.
    ///
    /// Returns `None` for frames that are not 3-channel.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.channels != 3 {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PixelRect;

use crate::rendering::glyphs::{lit_cells, GLYPH_ADVANCE, GLYPH_HEIGHT};
use crate::shared::constants::BOX_THICKNESS_DIVISOR;
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

/// Font pixel size used for face labels.
pub const LABEL_SCALE: u32 = 2;

/// Box line thickness for a frame: `round(height / 150)`, at least one pixel.
pub fn box_thickness(frame_height: u32) -> u32 {
    ((frame_height as f64 / BOX_THICKNESS_DIVISOR).round() as u32).max(1)
}

/// Drawing surface over an owned copy of a frame.
///
/// Everything drawn is clipped to the frame; nothing here can fail once
/// the surface exists.
pub struct Overlay {
    img: RgbImage,
    index: usize,
}

impl Overlay {
    /// Returns `None` for frames that are not 3-channel RGB.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        Some(Self {
            img: frame.to_rgb_image()?,
            index: frame.index(),
        })
    }

    /// Hollow rectangle through the pixel centers of `rect`'s corners,
    /// `thickness` lines wide and centered on that outline.
    pub fn draw_box(&mut self, rect: &Rect, color: [u8; 3], thickness: u32) {
        let t = thickness.max(1) as i32;
        for i in 0..t {
            let offset = i - t / 2;
            let x = rect.x1 - offset;
            let y = rect.y1 - offset;
            let w = rect.x2 - rect.x1 + 2 * offset + 1;
            let h = rect.y2 - rect.y1 + 2 * offset + 1;
            if w <= 0 || h <= 0 {
                continue;
            }
            let outline = PixelRect::at(x, y).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut self.img, outline, Rgb(color));
        }
    }

    /// Draws `text` with its bottom-left corner at `(x, baseline_y)`.
    pub fn draw_label(&mut self, x: i32, baseline_y: i32, text: &str, color: [u8; 3], scale: u32) {
        let scale = scale.max(1);
        let top = baseline_y - (GLYPH_HEIGHT * scale) as i32;
        let mut cursor_x = x;
        for ch in text.chars() {
            for (col, row) in lit_cells(ch) {
                let px = cursor_x + (col * scale) as i32;
                let py = top + (row * scale) as i32;
                let cell = PixelRect::at(px, py).of_size(scale, scale);
                draw_filled_rect_mut(&mut self.img, cell, Rgb(color));
            }
            cursor_x += (GLYPH_ADVANCE * scale) as i32;
        }
    }

    pub fn into_frame(self) -> Frame {
        Frame::from_rgb_image(self.img, self.index)
    }
}

/// Axis-aligned face rectangle in frame-pixel space, as `(x1, y1, x2, y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Zero or negative extent when the corners are inverted.
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1).max(0)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1).max(0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Grows the rectangle by `padding` on every side, then clamps it into
    /// `[0, width-1] × [0, height-1]`.
    ///
    /// The result always satisfies `0 <= x1 <= x2 <= width-1` and
    /// `0 <= y1 <= y2 <= height-1`, but may be degenerate (`x1 == x2`).
    /// Frame dimensions of zero are treated as one.
    pub fn pad_and_clamp(&self, padding: u32, frame_width: u32, frame_height: u32) -> Rect {
        let pad = i32::try_from(padding).unwrap_or(i32::MAX);
        let max_x = dimension_limit(frame_width);
        let max_y = dimension_limit(frame_height);

        let x1 = self.x1.saturating_sub(pad).clamp(0, max_x);
        let y1 = self.y1.saturating_sub(pad).clamp(0, max_y);
        let x2 = self.x2.saturating_add(pad).clamp(0, max_x).max(x1);
        let y2 = self.y2.saturating_add(pad).clamp(0, max_y).max(y1);

        Rect { x1, y1, x2, y2 }
    }
}

/// Highest valid index along a dimension, one pixel inside the edge.
fn dimension_limit(dimension: u32) -> i32 {
    i32::try_from(dimension.max(1) - 1).unwrap_or(i32::MAX)
}

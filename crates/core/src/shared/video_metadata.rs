use std::fmt;
use std::path::PathBuf;

/// Where frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    Image(PathBuf),
    Video(PathBuf),
    /// Capture device index (e.g. `0` → `/dev/video0` on Linux).
    Device(u32),
}

impl Default for InputSource {
    fn default() -> Self {
        InputSource::Device(0)
    }
}

impl InputSource {
    /// Live sources never run out on their own.
    pub fn is_live(&self) -> bool {
        matches!(self, InputSource::Device(_))
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Image(p) => write!(f, "image {}", p.display()),
            InputSource::Video(p) => write!(f, "video {}", p.display()),
            InputSource::Device(i) => write!(f, "capture device {i}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// 0.0 for still images or when the source does not report a rate.
    pub fps: f64,
    /// `None` for live sources.
    pub total_frames: Option<usize>,
    pub codec: String,
    pub source: InputSource,
}

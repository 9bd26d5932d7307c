use crate::shared::frame::Frame;
use crate::shared::video_metadata::{InputSource, VideoMetadata};

/// Reads frames from an image, a video file or a capture device.
///
/// Implementations handle I/O details (codec, container format, device
/// protocol) while the pipeline works with the abstract `Frame` and
/// `VideoMetadata` types.
pub trait VideoReader: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, source: &InputSource) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order. Live sources
    /// only end when the device stops delivering.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader. Safe to call twice.
    fn close(&mut self);
}

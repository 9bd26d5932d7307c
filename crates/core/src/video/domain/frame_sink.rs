use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Receives one annotated frame per processed input frame.
pub trait FrameSink: Send {
    fn open(&mut self, metadata: &VideoMetadata) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes and finalizes output. Safe to call twice.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

/// Discards every frame. Used when no output is requested and in tests.
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn open(&mut self, _metadata: &VideoMetadata) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn write(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

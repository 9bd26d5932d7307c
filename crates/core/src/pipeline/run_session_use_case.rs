use std::time::Instant;

use thiserror::Error;

use crate::pipeline::frame_report::FrameReport;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::process_frame_use_case::ProcessFrameUseCase;
use crate::pipeline::session_state::{SessionEvent, SessionState, StopReason};
use crate::pipeline::stop_signal::StopSignal;
use crate::shared::video_metadata::{InputSource, VideoMetadata};
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::video_reader::VideoReader;

/// Failures that end a session. Frame- and face-level problems never
/// surface here.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot open {input}: {message}")]
    SourceOpen { input: String, message: String },
    #[error("cannot read a frame from {input}: {message}")]
    FirstFrame { input: String, message: String },
    #[error("cannot open output: {0}")]
    SinkOpen(String),
    #[error("cannot write frame {index}: {message}")]
    SinkWrite { index: usize, message: String },
    #[error("cannot finalize output: {0}")]
    SinkClose(String),
}

/// Counters for one finished session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub frames_processed: usize,
    pub faces_classified: usize,
    pub frames_without_faces: usize,
    pub detector_failures: usize,
    pub skipped_candidates: usize,
    /// Frames the source failed to decode after the first one.
    pub frame_errors: usize,
    pub stop_reason: StopReason,
}

impl SessionSummary {
    fn new() -> Self {
        Self {
            frames_processed: 0,
            faces_classified: 0,
            frames_without_faces: 0,
            detector_failures: 0,
            skipped_candidates: 0,
            frame_errors: 0,
            stop_reason: StopReason::Exhausted,
        }
    }

    fn record(&mut self, report: &FrameReport) {
        self.frames_processed += 1;
        self.faces_classified += report.faces.len();
        self.skipped_candidates += report.skipped.len();
        if report.no_face() {
            self.frames_without_faces += 1;
        }
        if report.detector_error.is_some() {
            self.detector_failures += 1;
        }
    }
}

/// Loop controller: pulls frames until the source runs out or a stop is
/// requested, emitting exactly one annotated frame per processed frame.
pub struct RunSessionUseCase {
    reader: Box<dyn VideoReader>,
    sink: Box<dyn FrameSink>,
    frame_pipeline: ProcessFrameUseCase,
    logger: Box<dyn PipelineLogger>,
    stop: StopSignal,
}

impl RunSessionUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        sink: Box<dyn FrameSink>,
        frame_pipeline: ProcessFrameUseCase,
        logger: Box<dyn PipelineLogger>,
        stop: StopSignal,
    ) -> Self {
        Self {
            reader,
            sink,
            frame_pipeline,
            logger,
            stop,
        }
    }

    /// Runs the session to completion. The reader and sink are closed on
    /// every exit path.
    pub fn execute(&mut self, source: &InputSource) -> Result<SessionSummary, SessionError> {
        let metadata = self.reader.open(source).map_err(|e| SessionError::SourceOpen {
            input: source.to_string(),
            message: e.to_string(),
        })?;
        log::info!(
            "session started: {source} ({}x{}), threshold {}, padding {}",
            metadata.width,
            metadata.height,
            self.frame_pipeline.config().threshold.value(),
            self.frame_pipeline.config().padding
        );

        if let Err(e) = self.sink.open(&metadata) {
            self.reader.close();
            return Err(SessionError::SinkOpen(e.to_string()));
        }

        let result = self.run_loop(&metadata);
        self.reader.close();
        let closed = self.sink.close();

        let summary = result?;
        closed.map_err(|e| SessionError::SinkClose(e.to_string()))?;

        log::info!(
            "session stopped ({}): {} frames, {} faces",
            summary.stop_reason,
            summary.frames_processed,
            summary.faces_classified
        );
        self.logger.summary();
        Ok(summary)
    }

    fn run_loop(&mut self, metadata: &VideoMetadata) -> Result<SessionSummary, SessionError> {
        let mut summary = SessionSummary::new();
        let mut state = SessionState::AwaitingFrame;
        let mut frames = self.reader.frames();

        while !state.is_stopped() {
            let frame = match frames.next() {
                None => {
                    state = advance(state, SessionEvent::SourceExhausted);
                    continue;
                }
                Some(Err(e)) if summary.frames_processed == 0 && summary.frame_errors == 0 => {
                    return Err(SessionError::FirstFrame {
                        input: metadata.source.to_string(),
                        message: e.to_string(),
                    });
                }
                Some(Err(e)) => {
                    log::warn!("skipping undecodable frame: {e}");
                    summary.frame_errors += 1;
                    if self.stop.is_stopped() {
                        state = advance(state, SessionEvent::StopRequested);
                    }
                    continue;
                }
                Some(Ok(frame)) => frame,
            };
            state = advance(state, SessionEvent::FrameAcquired);

            let (annotated, report) = self.frame_pipeline.execute(&frame, self.logger.as_mut());
            state = advance(state, SessionEvent::FrameAnalyzed);

            for line in report.status_lines() {
                self.logger.status(&line);
            }
            self.logger.metric("faces", report.faces.len() as f64);

            let t0 = Instant::now();
            self.sink
                .write(&annotated)
                .map_err(|e| SessionError::SinkWrite {
                    index: annotated.index(),
                    message: e.to_string(),
                })?;
            self.logger
                .timing("emit", t0.elapsed().as_secs_f64() * 1000.0);
            state = advance(state, SessionEvent::FrameEmitted);

            summary.record(&report);
            self.logger
                .progress(summary.frames_processed, metadata.total_frames);

            if self.stop.is_stopped() {
                state = advance(state, SessionEvent::StopRequested);
            }
        }

        if let SessionState::Stopped(reason) = state {
            summary.stop_reason = reason;
        }
        Ok(summary)
    }
}

fn advance(state: SessionState, event: SessionEvent) -> SessionState {
    match state.on(event) {
        Some(next) => {
            log::trace!("{state:?} --{event:?}--> {next:?}");
            next
        }
        None => {
            log::error!("ignoring {event:?} in state {state:?}");
            state
        }
    }
}

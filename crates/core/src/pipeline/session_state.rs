use std::fmt;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The source ran out of frames.
    Exhausted,
    /// The stop signal fired.
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Exhausted => "source exhausted",
            StopReason::Requested => "stop requested",
        })
    }
}

/// Loop controller states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFrame,
    Processing,
    Annotating,
    Stopped(StopReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    FrameAcquired,
    /// Detection and classification finished for the current frame.
    FrameAnalyzed,
    /// The annotated frame reached the sink.
    FrameEmitted,
    SourceExhausted,
    StopRequested,
}

impl SessionState {
    pub fn is_stopped(self) -> bool {
        matches!(self, SessionState::Stopped(_))
    }

    /// Applies `event`. Returns `None` when the event is not valid in this
    /// state; `Stopped` is terminal.
    pub fn on(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Stopped(_), _) => None,
            (AwaitingFrame, FrameAcquired) => Some(Processing),
            (AwaitingFrame, SourceExhausted) => Some(Stopped(StopReason::Exhausted)),
            (Processing, FrameAnalyzed) => Some(Annotating),
            (Annotating, FrameEmitted) => Some(AwaitingFrame),
            (AwaitingFrame, StopRequested) => Some(Stopped(StopReason::Requested)),
            _ => None,
        }
    }
}

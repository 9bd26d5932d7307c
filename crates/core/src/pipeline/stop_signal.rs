use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Creates a connected stop handle and signal.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (StopHandle(tx), StopSignal::new(rx))
}

/// Requests a session stop from any thread.
#[derive(Clone)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // Full or disconnected both mean the request can't be lost.
        let _ = self.0.try_send(());
    }
}

/// Cooperative cancellation checked once per frame by the session loop.
///
/// Sticky: once a stop has been received it stays stopped. Dropping every
/// [`StopHandle`] does not stop the session.
pub struct StopSignal {
    rx: Receiver<()>,
    stopped: bool,
}

impl StopSignal {
    fn new(rx: Receiver<()>) -> Self {
        Self { rx, stopped: false }
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        Self::new(crossbeam_channel::never())
    }

    pub fn is_stopped(&mut self) -> bool {
        if !self.stopped {
            match self.rx.try_recv() {
                Ok(()) => self.stopped = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }
        }
        self.stopped
    }
}

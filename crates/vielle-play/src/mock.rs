//! Scripted backend for tests: signals are injected by hand, durations and
//! positions come from the test, and every transport call is recorded.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{
    backend::{AudioBackend, MediaSource, PlayerSignal},
    PlayError,
};

/// In-memory source for tests.
impl MediaSource for std::io::Cursor<Vec<u8>> {
    fn byte_len(&self) -> Option<u64> {
        Some(self.get_ref().len() as u64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockCall {
    SetDataSource,
    PrepareAsync,
    Start,
    Pause,
    Stop,
    Seek,
    Reset,
}

struct Shared {
    signals: broadcast::Sender<PlayerSignal>,
    position: Mutex<Duration>,
    duration: Mutex<Option<Duration>>,
    calls: Mutex<Vec<MockCall>>,
    source: Mutex<Option<Box<dyn MediaSource>>>,
}

/// Backend double driven from tests through its [`MockHandle`].
pub struct MockBackend {
    shared: Arc<Shared>,
}

/// Test-side handle to a [`MockBackend`].
#[derive(Clone)]
pub struct MockHandle {
    shared: Arc<Shared>,
}

impl MockBackend {
    pub fn new() -> (Self, MockHandle) {
        let (signals, _) = broadcast::channel(16);
        let shared = Arc::new(Shared {
            signals,
            position: Mutex::new(Duration::ZERO),
            duration: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            source: Mutex::new(None),
        });
        (
            Self {
                shared: shared.clone(),
            },
            MockHandle { shared },
        )
    }
}

impl AudioBackend for MockBackend {
    fn set_data_source(&mut self, source: Box<dyn MediaSource>) -> Result<(), PlayError> {
        self.shared.calls.lock().push(MockCall::SetDataSource);
        *self.shared.source.lock() = Some(source);
        Ok(())
    }

    fn prepare_async(&mut self) -> Result<(), PlayError> {
        self.shared.calls.lock().push(MockCall::PrepareAsync);
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlayError> {
        self.shared.calls.lock().push(MockCall::Start);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayError> {
        self.shared.calls.lock().push(MockCall::Pause);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayError> {
        self.shared.calls.lock().push(MockCall::Stop);
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayError> {
        self.shared.calls.lock().push(MockCall::Seek);
        *self.shared.position.lock() = position;
        Ok(())
    }

    fn position(&self) -> Duration {
        *self.shared.position.lock()
    }

    fn duration(&self) -> Option<Duration> {
        *self.shared.duration.lock()
    }

    fn reset(&mut self) {
        self.shared.calls.lock().push(MockCall::Reset);
        *self.shared.source.lock() = None;
        *self.shared.position.lock() = Duration::ZERO;
    }

    fn signals(&self) -> broadcast::Receiver<PlayerSignal> {
        self.shared.signals.subscribe()
    }
}

impl MockHandle {
    /// Inject a signal as if it came from the backend's decoder thread.
    pub fn emit(&self, signal: PlayerSignal) {
        let _ = self.shared.signals.send(signal);
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        *self.shared.duration.lock() = duration;
    }

    pub fn set_position(&self, position: Duration) {
        *self.shared.position.lock() = position;
    }

    pub fn position(&self) -> Duration {
        *self.shared.position.lock()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.shared.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.shared.calls.lock().clear();
    }

    /// Take the source the machine bound, to drive reads from the test.
    pub fn take_source(&self) -> Option<Box<dyn MediaSource>> {
        self.shared.source.lock().take()
    }

    pub fn has_source(&self) -> bool {
        self.shared.source.lock().is_some()
    }
}

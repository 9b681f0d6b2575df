use tokio::sync::broadcast;
use tracing::{debug, warn};
use vielle_events::{EventBus, PlayerEvent};

use crate::{
    backend::{AudioBackend, MediaSource, PlayerSignal},
    PlaybackState, PlayError,
};

/// The playback state machine.
///
/// Wraps one [`AudioBackend`] handle and exposes transport operations as a
/// strict state machine. Operations invalid in the current state are
/// no-ops, never errors — with one deliberate exception: `pause` and
/// `resume` always record the user's intent, even when the transport
/// transition itself does not apply. That intent decides whether the
/// asynchronous `Prepared` signal auto-starts playback.
///
/// Control-context calls and signal handling must be serialized by the
/// owner (the controller holds the machine behind one mutex per session).
pub struct Player {
    backend: Box<dyn AudioBackend>,
    state: PlaybackState,
    pause_intent: bool,
    events: EventBus,
}

impl Player {
    pub fn new(backend: Box<dyn AudioBackend>, events: EventBus) -> Self {
        Self {
            backend,
            state: PlaybackState::Idle,
            pause_intent: false,
            events,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn pause_intent(&self) -> bool {
        self.pause_intent
    }

    /// Subscribe to the backend's signal channel (for the signal pump).
    pub fn signals(&self) -> broadcast::Receiver<PlayerSignal> {
        self.backend.signals()
    }

    /// Bind a buffer-backed source. Valid from `Idle` only.
    pub fn set_data_source(&mut self, source: Box<dyn MediaSource>) {
        if self.state != PlaybackState::Idle {
            return;
        }
        match self.backend.set_data_source(source) {
            Ok(()) => self.state = PlaybackState::Initialized,
            Err(e) => self.fail(e),
        }
    }

    /// Begin asynchronous preparation. Valid from `Initialized` only.
    pub fn prepare_async(&mut self) {
        if self.state != PlaybackState::Initialized {
            return;
        }
        match self.backend.prepare_async() {
            Ok(()) => self.state = PlaybackState::Preparing,
            Err(e) => self.fail(e),
        }
    }

    /// Record pause intent; transition only applies from `Started`.
    ///
    /// A pause issued while `Preparing` is remembered and honored once the
    /// `Prepared` signal arrives, instead of being lost to the race.
    pub fn pause(&mut self) {
        self.pause_intent = true;
        if self.state == PlaybackState::Started {
            match self.backend.pause() {
                Ok(()) => {
                    self.state = PlaybackState::Paused;
                    self.events.publish(PlayerEvent::Paused);
                }
                Err(e) => self.fail(e),
            }
        }
    }

    /// Clear pause intent; starts playback from `Prepared`, `Paused`, or
    /// `Completed`.
    pub fn resume(&mut self) {
        self.pause_intent = false;
        if matches!(
            self.state,
            PlaybackState::Prepared | PlaybackState::Paused | PlaybackState::Completed
        ) {
            match self.backend.start() {
                Ok(()) => {
                    self.state = PlaybackState::Started;
                    self.events.publish(PlayerEvent::Started);
                }
                Err(e) => self.fail(e),
            }
        }
    }

    /// Halt playback; a fresh prepare cycle is needed afterwards.
    pub fn stop(&mut self) {
        if matches!(
            self.state,
            PlaybackState::Prepared
                | PlaybackState::Started
                | PlaybackState::Paused
                | PlaybackState::Completed
        ) {
            match self.backend.stop() {
                Ok(()) => {
                    self.state = PlaybackState::Stopped;
                    self.events.publish(PlayerEvent::Stopped);
                }
                Err(e) => self.fail(e),
            }
        }
    }

    /// Seek to `fraction` of the duration, clamped to `[0, 1]`. A no-op
    /// while the duration is still unknown, and in states where the
    /// backend holds no seekable source.
    pub fn seek_to(&mut self, fraction: f32) {
        if matches!(
            self.state,
            PlaybackState::Idle
                | PlaybackState::Initialized
                | PlaybackState::Preparing
                | PlaybackState::End
                | PlaybackState::Error
        ) {
            return;
        }
        if !fraction.is_finite() {
            return;
        }
        let Some(duration) = self.backend.duration() else {
            return;
        };
        let position = duration.mul_f32(fraction.clamp(0.0, 1.0));
        if let Err(e) = self.backend.seek_to(position) {
            self.fail(e);
        }
    }

    /// Return to `Idle`, clearing pause intent and releasing backend
    /// resources. Valid from any state.
    pub fn reset(&mut self) {
        self.backend.reset();
        self.state = PlaybackState::Idle;
        self.pause_intent = false;
    }

    /// Release the handle for good; the machine accepts nothing further.
    pub fn release(&mut self) {
        self.backend.reset();
        self.state = PlaybackState::End;
    }

    /// Playback position as a fraction of the duration.
    pub fn progress(&self) -> f32 {
        match self.state {
            PlaybackState::Idle
            | PlaybackState::Initialized
            | PlaybackState::Preparing
            | PlaybackState::Prepared
            | PlaybackState::Stopped
            | PlaybackState::Error => 0.0,
            PlaybackState::End | PlaybackState::Completed => 1.0,
            PlaybackState::Started | PlaybackState::Paused => {
                let Some(duration) = self.backend.duration() else {
                    return 0.0;
                };
                if duration.is_zero() {
                    return 0.0;
                }
                (self.backend.position().as_secs_f64() / duration.as_secs_f64()) as f32
            }
        }
    }

    /// Whether playback is active or imminently will be.
    ///
    /// `Preparing` counts as playing: absent an intervening pause,
    /// preparation auto-transitions into playback, and UI indicators
    /// should reflect that eventual intent.
    pub fn is_playing(&self) -> bool {
        if self.pause_intent {
            return false;
        }
        matches!(
            self.state,
            PlaybackState::Preparing | PlaybackState::Started
        )
    }

    /// Reconcile an asynchronous backend signal with the current state.
    pub fn handle_signal(&mut self, signal: PlayerSignal) {
        match signal {
            PlayerSignal::Prepared => {
                if self.state != PlaybackState::Preparing {
                    // A stale signal from a source reset underneath it.
                    return;
                }
                self.state = PlaybackState::Prepared;
                self.events.publish(PlayerEvent::Prepared);
                if !self.pause_intent {
                    match self.backend.start() {
                        Ok(()) => {
                            self.state = PlaybackState::Started;
                            self.events.publish(PlayerEvent::Started);
                        }
                        Err(e) => self.fail(e),
                    }
                }
            }
            PlayerSignal::Completed => {
                debug!("playback completed");
                self.state = PlaybackState::Completed;
                self.events.publish(PlayerEvent::Completed);
            }
            PlayerSignal::Error { code } => {
                warn!(code, "backend reported error");
                self.state = PlaybackState::Error;
                self.events.publish(PlayerEvent::Error { code });
            }
        }
    }

    fn fail(&mut self, error: PlayError) {
        warn!(%error, "backend transport call failed");
        self.state = PlaybackState::Error;
        self.events.publish(PlayerEvent::Error { code: -1 });
    }
}

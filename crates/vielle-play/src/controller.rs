use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::broadcast};
use tracing::debug;
use vielle_core::{Item, MediaLocation, MediaLocator};
use vielle_events::{EventBus, QueueEvent};
use vielle_queue::{DownloadQueue, LiveSource};
use vielle_storage::{ScratchBuffer, ScratchReader};

use crate::{
    backend::{AudioBackend, PlayerSignal},
    PlaybackState, PlayError, Player,
};

/// Glues the playback state machine to the download-slot pool.
///
/// Resolves "play item X" into: obtain a buffer (local file or pool slot),
/// feed it to the machine, and let the background fetch keep filling it.
/// While a buffer is bound, the controller holds it as the pool's live
/// source so no slot reuse can tear it out from under the player;
/// completion and errors release it again.
pub struct PlaybackController {
    player: Mutex<Player>,
    queue: Arc<DownloadQueue>,
    locator: Arc<dyn MediaLocator>,
    live: LiveSource,
    events: EventBus,
    current: Mutex<Option<Item>>,
}

impl PlaybackController {
    /// Build the controller and spawn its signal pump. Must be called from
    /// within a tokio runtime.
    pub fn new(
        backend: Box<dyn AudioBackend>,
        queue: Arc<DownloadQueue>,
        locator: Arc<dyn MediaLocator>,
        live: LiveSource,
        events: EventBus,
    ) -> Arc<Self> {
        let player = Mutex::new(Player::new(backend, events.clone()));
        let controller = Arc::new(Self {
            player,
            queue,
            locator,
            live,
            events,
            current: Mutex::new(None),
        });
        controller.spawn_signal_pump();
        controller
    }

    // Forwards backend signals into the machine under the session lock.
    // Holds only a weak reference so a dropped controller ends the task.
    fn spawn_signal_pump(self: &Arc<Self>) {
        let mut rx = self.player.lock().signals();
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let signal = match rx.recv().await {
                    Ok(signal) => signal,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                controller.on_signal(signal);
            }
        });
    }

    fn on_signal(&self, signal: PlayerSignal) {
        let ended = matches!(
            signal,
            PlayerSignal::Completed | PlayerSignal::Error { .. }
        );
        if ended {
            // The buffer is no longer being consumed; release it before
            // the state change becomes visible so slots are reclaimable
            // the moment callers observe Completed/Error.
            self.live.release();
        }
        self.player.lock().handle_signal(signal);
        if ended {
            self.events.publish(QueueEvent::WorkloadChanged);
        }
    }

    /// Begin playback of `item`, streaming it in the background when
    /// remote.
    ///
    /// # Errors
    ///
    /// Propagates resolution failures and the pool's transient
    /// `NoAvailableSlot`; the player is left untouched in that case.
    pub async fn play(&self, item: &Item) -> Result<(), PlayError> {
        let buffer = self.obtain_buffer(item).await?;
        let reader = ScratchReader::new(buffer.clone(), Handle::current());

        {
            let mut player = self.player.lock();
            player.reset();
            self.live.release();
            player.set_data_source(Box::new(reader));
            self.live.acquire(buffer.id());
            player.prepare_async();
        }

        debug!(path = item.path(), "playback starting");
        *self.current.lock() = Some(item.clone());
        self.events.publish(QueueEvent::WorkloadChanged);
        Ok(())
    }

    async fn obtain_buffer(&self, item: &Item) -> Result<ScratchBuffer, PlayError> {
        match self.locator.locate(item)? {
            MediaLocation::Local(path) => {
                debug!(path = %path.display(), "playing from local source");
                Ok(ScratchBuffer::open_complete(path).await?)
            }
            MediaLocation::Remote(url) => Ok(self.queue.buffer_for(item, &url).await?),
        }
    }

    /// Warm a slot for `item` without touching the player.
    pub async fn prefetch(&self, item: &Item) -> Result<(), PlayError> {
        if let MediaLocation::Remote(url) = self.locator.locate(item)? {
            self.queue.buffer_for(item, &url).await?;
        }
        Ok(())
    }

    pub fn pause(&self) {
        self.player.lock().pause();
    }

    pub fn resume(&self) {
        self.player.lock().resume();
    }

    pub fn stop(&self) {
        self.player.lock().stop();
    }

    pub fn seek_to(&self, fraction: f32) {
        self.player.lock().seek_to(fraction);
    }

    pub fn progress(&self) -> f32 {
        self.player.lock().progress()
    }

    pub fn is_playing(&self) -> bool {
        self.player.lock().is_playing()
    }

    pub fn state(&self) -> PlaybackState {
        self.player.lock().state()
    }

    pub fn current_item(&self) -> Option<Item> {
        self.current.lock().clone()
    }

    /// Drop the bound source and return the machine to `Idle`.
    pub fn clear(&self) {
        self.player.lock().reset();
        self.live.release();
        *self.current.lock() = None;
        self.events.publish(QueueEvent::WorkloadChanged);
    }

    /// Release the player handle for good.
    pub fn close(&self) {
        self.player.lock().release();
        self.live.release();
        self.events.publish(QueueEvent::WorkloadChanged);
    }
}

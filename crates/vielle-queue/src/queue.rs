use std::path::PathBuf;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;
use vielle_core::Item;
use vielle_events::EventBus;
use vielle_net::HttpClient;
use vielle_storage::{BufferStatus, ScratchBuffer};

use crate::{live::LiveSource, slot::DownloadSlot, QueueError};

/// Options for building a download queue.
#[derive(Clone, Debug)]
pub struct QueueOptions {
    /// Directory holding one scratch file per slot.
    pub scratch_dir: PathBuf,
    /// Number of slots. The default of two covers the playing track plus a
    /// prefetch of the next one.
    pub slot_count: usize,
    /// Cancellation token for the whole pool's lifecycle.
    pub cancel: CancellationToken,
}

impl QueueOptions {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            slot_count: 2,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_slot_count(mut self, count: usize) -> Self {
        self.slot_count = count;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Fixed pool of download slots.
///
/// A request for an item already bound to a slot reuses that slot,
/// whatever its state — the same item never occupies two slots and never
/// downloads twice. Otherwise an idle slot is preferred over a merely
/// interruptible one, and a slot whose buffer is the live playback source
/// is never selected. Selection and binding happen under one lock, so two
/// concurrent requests cannot pick the same slot.
pub struct DownloadQueue {
    slots: Mutex<Vec<DownloadSlot>>,
    events: EventBus,
}

impl DownloadQueue {
    pub async fn new(
        options: QueueOptions,
        http: HttpClient,
        events: EventBus,
        live: LiveSource,
    ) -> Result<Self, QueueError> {
        tokio::fs::create_dir_all(&options.scratch_dir).await?;

        let slots = (0..options.slot_count.max(1))
            .map(|i| {
                DownloadSlot::new(
                    options.scratch_dir.join(format!("stream-{i}.part")),
                    http.clone(),
                    events.clone(),
                    live.clone(),
                    options.cancel.child_token(),
                )
            })
            .collect();

        Ok(Self {
            slots: Mutex::new(slots),
            events,
        })
    }

    /// Obtain the buffer for `item`, binding a slot and starting (or
    /// continuing) its background download as needed.
    ///
    /// # Errors
    ///
    /// [`QueueError::NoAvailableSlot`] when every slot is live or busy;
    /// the caller may retry after the next workload-changed notification.
    pub async fn buffer_for(&self, item: &Item, url: &Url) -> Result<ScratchBuffer, QueueError> {
        let mut slots = self.slots.lock().await;

        // Reuse an existing binding for this item regardless of its state.
        if let Some(slot) = slots.iter_mut().find(|s| s.has_buffer_for(item)) {
            if let Some(buffer) = slot.buffer().cloned() {
                if matches!(buffer.status().await, BufferStatus::Failed) {
                    // Poisoned by a disk error; only a fresh binding helps.
                    debug!(path = item.path(), "rebinding poisoned buffer");
                    let buffer = slot.assign(item.clone()).await?;
                    slot.begin_background_download(url).await;
                    return Ok(buffer);
                }
                slot.begin_background_download(url).await;
                return Ok(buffer);
            }
        }

        let index = {
            let idle = slots.iter().position(DownloadSlot::is_idle);
            idle.or_else(|| slots.iter().position(DownloadSlot::can_be_interrupted))
                .ok_or(QueueError::NoAvailableSlot)?
        };

        let slot = &mut slots[index];
        debug!(path = item.path(), slot = index, "binding slot");
        let buffer = slot.assign(item.clone()).await?;
        slot.begin_background_download(url).await;
        Ok(buffer)
    }

    /// Cancel the download bound to `item`, if any. The binding is kept.
    pub async fn stop_download(&self, item: &Item) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.iter_mut().find(|s| s.has_buffer_for(item)) {
            slot.stop_background_download();
        }
    }

    /// Whether a download for `item` is currently pending or running.
    pub async fn is_downloading(&self, item: &Item) -> bool {
        let slots = self.slots.lock().await;
        slots.iter().any(|s| s.is_downloading(item))
    }

    /// Number of slots currently idle.
    pub async fn idle_slots(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.iter().filter(|s| s.is_idle()).count()
    }

    pub async fn slot_count(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Release every binding: cancel all jobs, close all buffers, delete
    /// scratch files.
    pub async fn stop_all(&self) {
        let mut slots = self.slots.lock().await;
        for slot in slots.iter_mut() {
            slot.release().await;
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use vielle_core::Item;
use vielle_events::{EventBus, QueueEvent};
use vielle_net::HttpClient;
use vielle_storage::{BufferStatus, ScratchBuffer, ScratchOptions};

use crate::{
    fetch::{FetchJob, FetchStatus},
    live::LiveSource,
    QueueError,
};

/// One reusable binding of a fetch job and a scratch buffer to an item.
///
/// A slot owns at most one `(Item, FetchJob, ScratchBuffer)` triple at a
/// time; rebinding fully releases the previous job and buffer first. Every
/// mutating call publishes [`QueueEvent::WorkloadChanged`].
pub struct DownloadSlot {
    scratch_path: PathBuf,
    http: HttpClient,
    events: EventBus,
    live: LiveSource,
    cancel: CancellationToken,
    item: Option<Item>,
    job: Option<FetchJob>,
    buffer: Option<ScratchBuffer>,
}

impl DownloadSlot {
    pub(crate) fn new(
        scratch_path: PathBuf,
        http: HttpClient,
        events: EventBus,
        live: LiveSource,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            scratch_path,
            http,
            events,
            live,
            cancel,
            item: None,
            job: None,
            buffer: None,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn buffer(&self) -> Option<&ScratchBuffer> {
        self.buffer.as_ref()
    }

    /// Whether this slot holds a buffer for `item`.
    pub fn has_buffer_for(&self, item: &Item) -> bool {
        self.buffer.is_some() && self.item.as_ref().is_some_and(|i| i.same_track(item))
    }

    /// Whether a download for `item` is pending or running here.
    pub fn is_downloading(&self, item: &Item) -> bool {
        self.has_buffer_for(item) && self.job.as_ref().is_some_and(|j| j.status().is_active())
    }

    fn buffer_is_live(&self) -> bool {
        self.buffer.as_ref().is_some_and(|b| self.live.is_live(b.id()))
    }

    /// No active job, and the buffer is not being consumed by playback.
    /// A slot whose download finished but whose buffer is still the live
    /// player source is not idle.
    pub fn is_idle(&self) -> bool {
        let job_active = self.job.as_ref().is_some_and(|j| j.status().is_active());
        !job_active && !self.buffer_is_live()
    }

    /// The buffer is not being consumed by playback, regardless of job
    /// state. An in-progress download may be interrupted and rebound when
    /// nothing is playing from it.
    pub fn can_be_interrupted(&self) -> bool {
        !self.buffer_is_live()
    }

    /// Release any previous binding and bind a fresh empty buffer to
    /// `item`. The background download is not started here.
    pub async fn assign(&mut self, item: Item) -> Result<ScratchBuffer, QueueError> {
        self.release().await;

        let buffer = ScratchBuffer::open(ScratchOptions::new(
            self.scratch_path.clone(),
            self.cancel.child_token(),
        ))
        .await?;

        debug!(path = item.path(), "slot bound");
        self.item = Some(item);
        self.buffer = Some(buffer.clone());
        self.events.publish(QueueEvent::WorkloadChanged);
        Ok(buffer)
    }

    /// Start (or resume) the background download for the current binding.
    ///
    /// Idempotent: a no-op while a job is pending or running, or once the
    /// buffer is sealed. A re-issued download resumes at the watermark.
    pub async fn begin_background_download(&mut self, url: &Url) {
        let Some(buffer) = self.buffer.clone() else {
            warn!("begin_background_download on an unbound slot");
            return;
        };

        if self.job.as_ref().is_some_and(|j| j.status().is_active()) {
            return;
        }
        if matches!(buffer.status().await, BufferStatus::Sealed { .. }) {
            return;
        }

        buffer.clear_stalled().await;
        let start_offset = buffer.watermark().await;
        debug!(%url, start_offset, "beginning background download");
        self.job = Some(FetchJob::spawn(
            self.http.clone(),
            url.clone(),
            buffer,
            start_offset,
            self.events.clone(),
            &self.cancel,
        ));
        self.events.publish(QueueEvent::WorkloadChanged);
    }

    /// Cancel the active download, if any. The binding is kept; a later
    /// `begin_background_download` resumes where it stopped.
    pub fn stop_background_download(&mut self) {
        if let Some(job) = &self.job {
            if job.status().is_active() {
                job.cancel();
                self.events.publish(QueueEvent::WorkloadChanged);
            }
        }
    }

    /// Status of the current job, if one was ever started for this binding.
    pub fn job_status(&self) -> Option<FetchStatus> {
        self.job.as_ref().map(FetchJob::status)
    }

    /// Fully release the binding: cancel the job, close the buffer, remove
    /// the scratch file.
    pub async fn release(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel();
        }
        if let Some(buffer) = self.buffer.take() {
            buffer.close().await;
            let _ = tokio::fs::remove_file(buffer.path()).await;
        }
        if self.item.take().is_some() {
            self.events.publish(QueueEvent::WorkloadChanged);
        }
    }
}

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vielle_api::{LocalIndex, MediaRouter, ServerApi};
use vielle_core::MediaLocator;
use vielle_events::EventBus;
use vielle_net::HttpClient;
use vielle_play::{AudioBackend, PlaybackController};
use vielle_queue::{DownloadQueue, LiveSource, QueueError, QueueOptions};

use crate::SessionConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// One playback session: the server API client, the download-slot pool,
/// and the playback controller, wired together with explicitly passed
/// handles.
///
/// The underlying player handle is created once here and released on
/// [`close`](Self::close).
pub struct Session {
    api: Arc<ServerApi>,
    queue: Arc<DownloadQueue>,
    controller: Arc<PlaybackController>,
    events: EventBus,
    cancel: CancellationToken,
}

impl Session {
    /// Bootstrap a session. Must be called from within a tokio runtime.
    pub async fn new(
        config: SessionConfig,
        backend: Box<dyn AudioBackend>,
    ) -> Result<Self, SessionError> {
        let cancel = config.cancel.unwrap_or_default();
        let events = EventBus::new(config.event_capacity);
        let http = HttpClient::new(config.net);

        let mut api = ServerApi::new(http.clone(), config.server_url);
        if let Some(credentials) = config.credentials {
            api = api.with_credentials(credentials);
        }
        let api = Arc::new(api);

        let live = LiveSource::new();
        let queue = Arc::new(
            DownloadQueue::new(
                QueueOptions::new(config.scratch_dir)
                    .with_slot_count(config.slot_count)
                    .with_cancel(cancel.clone()),
                http,
                events.clone(),
                live.clone(),
            )
            .await?,
        );

        let locator: Arc<dyn MediaLocator> = Arc::new(MediaRouter::new(
            config.local_library.map(LocalIndex::new),
            api.clone(),
        ));

        let controller = PlaybackController::new(
            backend,
            queue.clone(),
            locator,
            live,
            events.clone(),
        );

        debug!("session ready");
        Ok(Self {
            api,
            queue,
            controller,
            events,
            cancel,
        })
    }

    pub fn api(&self) -> &ServerApi {
        &self.api
    }

    pub fn queue(&self) -> &DownloadQueue {
        &self.queue
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Release the player handle, tear down the pool, and cancel all
    /// session work.
    pub async fn close(&self) {
        self.controller.close();
        self.queue.stop_all().await;
        self.cancel.cancel();
    }
}

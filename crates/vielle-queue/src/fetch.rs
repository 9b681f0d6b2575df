use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use vielle_events::{EventBus, FetchEvent};
use vielle_net::{ByteStream, HttpClient, RangeSpec};
use vielle_storage::ScratchBuffer;

/// Lifecycle of a background fetch. Terminal states are never left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    Running,
    Finished,
    Failed,
    Cancelled,
}

impl FetchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Cancelled)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// Handle to a spawned background fetch.
///
/// The task streams chunks from `url` into the buffer, allowing a player to
/// read concurrently. Cancellation is cooperative: observed between chunks,
/// never tearing a write in half. A non-zero `start_offset` resumes an
/// earlier transfer with an HTTP Range request.
#[derive(Debug)]
pub struct FetchJob {
    status_rx: watch::Receiver<FetchStatus>,
    cancel: CancellationToken,
}

impl FetchJob {
    pub fn spawn(
        http: HttpClient,
        url: Url,
        buffer: ScratchBuffer,
        start_offset: u64,
        events: EventBus,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let (status_tx, status_rx) = watch::channel(FetchStatus::Pending);
        tokio::spawn(run(
            http,
            url,
            buffer,
            start_offset,
            events,
            cancel.clone(),
            status_tx,
        ));
        Self { status_rx, cancel }
    }

    pub fn status(&self) -> FetchStatus {
        *self.status_rx.borrow()
    }

    /// Request cooperative cancellation. Ignored once the job is terminal.
    pub fn cancel(&self) {
        if self.status().is_active() {
            self.cancel.cancel();
        }
    }

    /// Wait until the job reaches a terminal status.
    pub async fn settled(&self) -> FetchStatus {
        let mut rx = self.status_rx.clone();
        loop {
            let status = *rx.borrow_and_update();
            if status.is_terminal() {
                return status;
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }
}

async fn run(
    http: HttpClient,
    url: Url,
    buffer: ScratchBuffer,
    start_offset: u64,
    events: EventBus,
    cancel: CancellationToken,
    status: watch::Sender<FetchStatus>,
) {
    let _ = status.send(FetchStatus::Running);
    events.publish(FetchEvent::Started {
        offset: start_offset,
    });

    // Total length is a hint (seek-from-end support); absence is tolerated.
    if let Ok(headers) = http.head(url.clone(), None).await {
        if let Some(len) = headers.content_length() {
            buffer.set_total_hint(len).await;
        }
    }

    let stream = open_stream(&http, &url, start_offset).await;
    let mut stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            warn!(%url, error = %e, "failed to open download stream");
            buffer.mark_stalled(format!("fetch failed: {e}")).await;
            let _ = status.send(FetchStatus::Failed);
            events.publish(FetchEvent::Failed {
                error: e.to_string(),
            });
            return;
        }
    };

    loop {
        let next = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(%url, "download cancelled");
                buffer.mark_stalled("download cancelled").await;
                let _ = status.send(FetchStatus::Cancelled);
                events.publish(FetchEvent::Cancelled);
                return;
            }

            next = stream.next() => next,
        };

        match next {
            Some(Ok(bytes)) => {
                if bytes.is_empty() {
                    continue;
                }
                match buffer.append(&bytes).await {
                    Ok(watermark) => {
                        events.publish(FetchEvent::Progress {
                            offset: watermark,
                            total: buffer.total_len().await,
                        });
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "scratch write failed");
                        let _ = status.send(FetchStatus::Failed);
                        events.publish(FetchEvent::Failed {
                            error: e.to_string(),
                        });
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                warn!(%url, error = %e, "download stream error");
                buffer.mark_stalled(format!("fetch failed: {e}")).await;
                let _ = status.send(FetchStatus::Failed);
                events.publish(FetchEvent::Failed {
                    error: e.to_string(),
                });
                return;
            }
            None => {
                let total_bytes = buffer.watermark().await;
                match buffer.commit(Some(total_bytes)).await {
                    Ok(()) => {
                        debug!(%url, total_bytes, "download complete");
                        let _ = status.send(FetchStatus::Finished);
                        events.publish(FetchEvent::Completed { total_bytes });
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "failed to seal buffer");
                        let _ = status.send(FetchStatus::Failed);
                        events.publish(FetchEvent::Failed {
                            error: e.to_string(),
                        });
                    }
                }
                return;
            }
        }
    }
}

async fn open_stream(
    http: &HttpClient,
    url: &Url,
    start_offset: u64,
) -> Result<ByteStream, vielle_net::NetError> {
    if start_offset == 0 {
        http.stream(url.clone(), None).await
    } else {
        http.get_range(url.clone(), RangeSpec::from_start(start_offset), None)
            .await
    }
}

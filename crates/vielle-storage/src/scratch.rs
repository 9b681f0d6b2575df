use std::{
    fmt,
    io::SeekFrom,
    ops::Range,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::{Mutex, Notify},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{StorageError, StorageResult};

/// Process-unique identifier of a scratch buffer.
///
/// Used by the playback layer to record which buffer is the live data
/// source of the player without holding a reference to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

impl BufferId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

fn next_buffer_id() -> BufferId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    BufferId(NEXT.fetch_add(1, Ordering::Relaxed))
}

/// Options for opening a scratch buffer.
#[derive(Clone, Debug)]
pub struct ScratchOptions {
    /// Path to the backing scratch file. Created (or truncated) on open.
    pub path: PathBuf,

    /// Cancellation token for this buffer's lifecycle. Waits never hang
    /// once the owning binding is cancelled.
    pub cancel: CancellationToken,
}

impl ScratchOptions {
    pub fn new(path: impl Into<PathBuf>, cancel: CancellationToken) -> Self {
        Self {
            path: path.into(),
            cancel,
        }
    }
}

/// Result of waiting for a byte range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The requested range is available for reading.
    Ready,
    /// The buffer is sealed and the range starts at/after end of data.
    Eof,
}

/// Lifecycle snapshot of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferStatus {
    /// A writer may still append.
    Filling,
    /// The writer reached a terminal outcome without sealing; a new writer
    /// may resume at the watermark.
    Stalled,
    /// Sealed; end of data is defined.
    Sealed { final_len: u64 },
    /// Permanently poisoned.
    Failed,
}

/// A partially-written local byte store with a monotonic watermark.
///
/// Clone is cheap; all clones refer to the same underlying buffer. Exactly
/// one writer appends at a time; any number of readers may read the
/// already-written prefix concurrently.
///
/// # Contract
/// - `append` writes at the watermark only; the watermark never decreases.
/// - `read_at` does not wait: below the watermark it returns exact bytes,
///   at/after it reports `NotYetAvailable` (or EOF once sealed). It never
///   returns garbage.
/// - `wait_range` suspends until the range is covered, EOF applies, or a
///   terminal/stall signal releases the waiter with an error.
/// - `commit` seals the buffer; subsequent appends fail with `Sealed`.
/// - `close` is idempotent and wakes all waiters.
#[derive(Clone)]
pub struct ScratchBuffer {
    inner: Arc<Inner>,
}

impl fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl ScratchBuffer {
    /// Create (or truncate) the scratch file and open an empty buffer.
    pub async fn open(opts: ScratchOptions) -> StorageResult<Self> {
        if let Some(parent) = opts.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&opts.path)
            .await?;

        Ok(Self {
            inner: Arc::new(Inner {
                id: next_buffer_id(),
                path: opts.path,
                cancel: opts.cancel,
                file: Mutex::new(file),
                state: Mutex::new(State::empty()),
                notify: Notify::new(),
            }),
        })
    }

    /// Open an already-complete local file as a sealed buffer.
    ///
    /// Local sources satisfy the same contract as a remote download that
    /// has finished: the watermark equals the file length and EOF is
    /// defined.
    pub async fn open_complete(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let file = OpenOptions::new().read(true).open(&path).await?;
        let len = file.metadata().await?.len();

        Ok(Self {
            inner: Arc::new(Inner {
                id: next_buffer_id(),
                path,
                cancel: CancellationToken::new(),
                file: Mutex::new(file),
                state: Mutex::new(State::sealed(len)),
                notify: Notify::new(),
            }),
        })
    }

    pub fn id(&self) -> BufferId {
        self.inner.id
    }

    /// Path of the backing scratch file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Count of contiguously valid bytes written so far.
    pub async fn watermark(&self) -> u64 {
        self.inner.state.lock().await.watermark
    }

    /// Total length: the sealed length, or the remote-reported hint.
    pub async fn total_len(&self) -> Option<u64> {
        let state = self.inner.state.lock().await;
        state.final_len.or(state.total_hint)
    }

    pub async fn status(&self) -> BufferStatus {
        let state = self.inner.state.lock().await;
        if state.failed.is_some() {
            BufferStatus::Failed
        } else if state.sealed {
            BufferStatus::Sealed {
                final_len: state.final_len.unwrap_or(state.watermark),
            }
        } else if state.stalled.is_some() {
            BufferStatus::Stalled
        } else {
            BufferStatus::Filling
        }
    }

    /// Record the remote-reported total length before sealing.
    pub async fn set_total_hint(&self, len: u64) {
        let mut state = self.inner.state.lock().await;
        if !state.sealed {
            state.total_hint = Some(len);
        }
    }

    /// Append bytes at the watermark. Returns the new watermark.
    pub async fn append(&self, data: &[u8]) -> StorageResult<u64> {
        if self.inner.cancel.is_cancelled() {
            return Err(StorageError::Cancelled);
        }

        let offset = {
            let state = self.inner.state.lock().await;
            if let Some(err) = &state.failed {
                return Err(StorageError::Failed(err.clone()));
            }
            if state.closed {
                return Err(StorageError::Closed);
            }
            if state.sealed {
                return Err(StorageError::Sealed);
            }
            state.watermark
        };

        if data.is_empty() {
            return Ok(offset);
        }

        let new_watermark =
            offset
                .checked_add(data.len() as u64)
                .ok_or(StorageError::InvalidRange {
                    start: offset,
                    end: offset,
                })?;

        {
            let mut file = self.inner.file.lock().await;
            let write = async {
                file.seek(SeekFrom::Start(offset)).await?;
                file.write_all(data).await?;
                Ok::<(), std::io::Error>(())
            };
            if let Err(e) = write.await {
                // A short write leaves the region beyond the watermark
                // undefined, which readers never observe.
                self.inner.state.lock().await.failed = Some(e.to_string());
                self.inner.notify.notify_waiters();
                return Err(StorageError::Io(e));
            }
        }

        {
            let mut state = self.inner.state.lock().await;
            state.watermark = new_watermark;
        }

        self.inner.notify.notify_waiters();
        Ok(new_watermark)
    }

    /// Read at `offset` without waiting.
    ///
    /// Returns the exact bytes previously appended there, `Ok(0)` at/after
    /// end of data once sealed, `NotYetAvailable` past the watermark while
    /// filling, and `OutOfRange` past a known total length.
    pub async fn read_at(&self, offset: u64, buf: &mut [u8]) -> StorageResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let readable = {
            let state = self.inner.state.lock().await;
            if let Some(err) = &state.failed {
                return Err(StorageError::Failed(err.clone()));
            }
            if state.closed {
                return Err(StorageError::Closed);
            }

            if state.sealed {
                let final_len = state.final_len.unwrap_or(state.watermark);
                if offset > final_len {
                    return Err(StorageError::OutOfRange {
                        offset,
                        total: final_len,
                    });
                }
                if offset == final_len {
                    return Ok(0);
                }
            } else if offset >= state.watermark {
                return Err(StorageError::NotYetAvailable { offset });
            }

            let limit = state
                .final_len
                .map_or(state.watermark, |f| f.min(state.watermark));
            if offset >= limit {
                // Sealed with a final length beyond the watermark: the
                // region was never written.
                return Ok(0);
            }
            (limit - offset).min(buf.len() as u64) as usize
        };

        let mut file = self.inner.file.lock().await;
        file.seek(SeekFrom::Start(offset)).await?;
        file.read_exact(&mut buf[..readable]).await?;
        Ok(readable)
    }

    /// Suspend until `range` becomes readable, or EOF/failure/stall/
    /// cancellation applies.
    pub async fn wait_range(&self, range: Range<u64>) -> StorageResult<WaitOutcome> {
        if range.start >= range.end {
            return Err(StorageError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }

        loop {
            // Register for wakeups before inspecting state so a concurrent
            // append between the check and the await is not missed.
            let notified = self.inner.notify.notified();

            {
                let state = self.inner.state.lock().await;

                if let Some(err) = &state.failed {
                    return Err(StorageError::Failed(err.clone()));
                }
                if state.closed {
                    return Err(StorageError::Closed);
                }

                if range.end <= state.watermark {
                    return Ok(WaitOutcome::Ready);
                }

                if state.sealed {
                    let final_len = state.final_len.unwrap_or(state.watermark);
                    if range.start >= final_len {
                        return Ok(WaitOutcome::Eof);
                    }
                    // Only the part before EOF matters.
                    if range.end.min(final_len) <= state.watermark {
                        return Ok(WaitOutcome::Ready);
                    }
                    // Sealed short of the requested range: no more bytes
                    // are coming.
                    return Err(StorageError::OutOfRange {
                        offset: range.start,
                        total: state.watermark,
                    });
                }

                if let Some(reason) = &state.stalled {
                    return Err(StorageError::Stalled(reason.clone()));
                }
            }

            tokio::select! {
                () = self.inner.cancel.cancelled() => return Err(StorageError::Cancelled),
                () = notified => {}
            }
        }
    }

    /// Seal the buffer, defining end of data. `None` seals at the current
    /// watermark.
    pub async fn commit(&self, final_len: Option<u64>) -> StorageResult<()> {
        {
            let mut state = self.inner.state.lock().await;
            if let Some(err) = &state.failed {
                return Err(StorageError::Failed(err.clone()));
            }
            if state.closed {
                return Err(StorageError::Closed);
            }
            let final_len = final_len.unwrap_or(state.watermark);
            state.sealed = true;
            state.final_len = Some(final_len);
            state.stalled = None;
            debug!(final_len, "buffer sealed");
        }
        self.inner.notify.notify_waiters();
        Ok(())
    }

    /// Permanently poison the buffer, waking all waiters.
    pub async fn fail(&self, reason: impl Into<String>) {
        {
            let mut state = self.inner.state.lock().await;
            state.failed = Some(reason.into());
        }
        self.inner.notify.notify_waiters();
    }

    /// Release current waiters after a resumable terminal outcome of the
    /// writer (cancelled or failed download). Already-written bytes stay
    /// readable; a re-issued writer calls [`clear_stalled`](Self::clear_stalled)
    /// and resumes appending at the watermark.
    pub async fn mark_stalled(&self, reason: impl Into<String>) {
        {
            let mut state = self.inner.state.lock().await;
            if state.sealed || state.failed.is_some() || state.closed {
                return;
            }
            state.stalled = Some(reason.into());
        }
        self.inner.notify.notify_waiters();
    }

    pub async fn clear_stalled(&self) {
        self.inner.state.lock().await.stalled = None;
    }

    /// Close the buffer, waking all waiters. Idempotent. Callers must first
    /// ensure the buffer is not the live data source of a player.
    pub async fn close(&self) {
        {
            let mut state = self.inner.state.lock().await;
            if state.closed {
                return;
            }
            state.closed = true;
        }
        self.inner.notify.notify_waiters();
    }
}

struct Inner {
    id: BufferId,
    path: PathBuf,
    cancel: CancellationToken,
    file: Mutex<File>,
    state: Mutex<State>,
    notify: Notify,
}

#[derive(Debug)]
struct State {
    watermark: u64,
    total_hint: Option<u64>,
    sealed: bool,
    final_len: Option<u64>,
    failed: Option<String>,
    stalled: Option<String>,
    closed: bool,
}

impl State {
    fn empty() -> Self {
        Self {
            watermark: 0,
            total_hint: None,
            sealed: false,
            final_len: None,
            failed: None,
            stalled: None,
            closed: false,
        }
    }

    fn sealed(len: u64) -> Self {
        Self {
            watermark: len,
            total_hint: Some(len),
            sealed: true,
            final_len: Some(len),
            failed: None,
            stalled: None,
            closed: false,
        }
    }
}

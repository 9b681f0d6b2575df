use std::io::{self, Read, Seek, SeekFrom};

use tokio::runtime::Handle;

use crate::{ScratchBuffer, StorageError, WaitOutcome};

/// Blocking `Read + Seek` view of a [`ScratchBuffer`].
///
/// Bridges the async buffer to decoder threads: reads suspend (via the
/// runtime handle) until the bytes arrive or the buffer reaches a terminal
/// outcome. Must be driven from a thread outside the async runtime — the
/// backend's own decode thread, a `spawn_blocking` closure, or a plain
/// `std::thread` in tests.
pub struct ScratchReader {
    buffer: ScratchBuffer,
    handle: Handle,
    pos: u64,
}

impl ScratchReader {
    pub fn new(buffer: ScratchBuffer, handle: Handle) -> Self {
        Self {
            buffer,
            handle,
            pos: 0,
        }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Total length in bytes, when the buffer knows it.
    pub fn total_len(&self) -> Option<u64> {
        self.handle.block_on(self.buffer.total_len())
    }

    pub fn buffer(&self) -> &ScratchBuffer {
        &self.buffer
    }
}

fn into_io(err: StorageError) -> io::Error {
    match err {
        StorageError::Io(e) => e,
        StorageError::Cancelled | StorageError::Closed => {
            io::Error::new(io::ErrorKind::Interrupted, err)
        }
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

impl Read for ScratchReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let pos = self.pos;
        let buffer = self.buffer.clone();
        let n = self
            .handle
            .block_on(async {
                match buffer.wait_range(pos..pos + 1).await? {
                    WaitOutcome::Eof => Ok(0),
                    WaitOutcome::Ready => buffer.read_at(pos, buf).await,
                }
            })
            .map_err(into_io)?;

        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ScratchReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => {
                let total = self.total_len().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::Unsupported,
                        "total length unknown; cannot seek from end",
                    )
                })?;
                total.checked_add_signed(delta)
            }
        };

        match target {
            Some(offset) => {
                self.pos = offset;
                Ok(offset)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of buffer",
            )),
        }
    }
}

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use vielle_storage::BufferId;

/// Records which buffer, if any, is the live data source of the player.
///
/// Shared between the playback controller (writer) and the slot pool
/// (readers). This is the single authoritative ownership check behind both
/// `DownloadSlot::is_idle` and `DownloadSlot::can_be_interrupted`, so the
/// two can never diverge.
#[derive(Clone, Debug, Default)]
pub struct LiveSource {
    // Zero means no live source; `BufferId`s start at one.
    inner: Arc<AtomicU64>,
}

impl LiveSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as the player's live data source.
    pub fn acquire(&self, id: BufferId) {
        self.inner.store(id.as_u64(), Ordering::Release);
    }

    /// Clear the live source.
    pub fn release(&self) {
        self.inner.store(0, Ordering::Release);
    }

    pub fn is_live(&self, id: BufferId) -> bool {
        self.inner.load(Ordering::Acquire) == id.as_u64()
    }

    pub fn is_any_live(&self) -> bool {
        self.inner.load(Ordering::Acquire) != 0
    }
}

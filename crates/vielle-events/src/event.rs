/// Top-level event carried on the bus.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Queue(QueueEvent),
    Fetch(FetchEvent),
    Player(PlayerEvent),
}

/// Slot pool notifications.
///
/// `WorkloadChanged` carries no payload: observers re-query slot state
/// directly and decide whether to issue further requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueEvent {
    WorkloadChanged,
}

/// Background fetch observability.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchEvent {
    Started { offset: u64 },
    Progress { offset: u64, total: Option<u64> },
    Completed { total_bytes: u64 },
    Failed { error: String },
    Cancelled,
}

/// Player lifecycle notifications, surfaced so the owner of the controller
/// can release slots and advance to the next item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Prepared,
    Started,
    Paused,
    Stopped,
    Completed,
    Error { code: i32 },
}

impl From<QueueEvent> for Event {
    fn from(event: QueueEvent) -> Self {
        Self::Queue(event)
    }
}

impl From<FetchEvent> for Event {
    fn from(event: FetchEvent) -> Self {
        Self::Fetch(event)
    }
}

impl From<PlayerEvent> for Event {
    fn from(event: PlayerEvent) -> Self {
        Self::Player(event)
    }
}

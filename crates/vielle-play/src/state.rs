/// Transport lifecycle of the underlying player handle.
///
/// `Idle` is the initial state; `End` is terminal (the handle has been
/// released). The machine moves between the others per the operation
/// table on [`Player`](crate::Player) — invalid operations never change
/// state and never error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Idle,
    Initialized,
    Preparing,
    Prepared,
    Started,
    Paused,
    Stopped,
    Completed,
    Error,
    End,
}

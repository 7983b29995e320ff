//! Notifications published on every committed session change.

use super::state::SessionSnapshot;

/// What kind of change produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeKind {
    /// A new game started.
    NewGame,
    /// The human's move was applied.
    PlayerMoved,
    /// The engine's move was applied.
    EngineMoved,
    /// The engine request failed or returned an unusable move.
    EngineFailed,
    /// A failed engine request was re-issued.
    RetryIssued,
    /// The human resigned.
    Resigned,
    /// Engine level or search budget changed.
    SettingsChanged,
    /// The error field was cleared.
    ErrorCleared,
}

/// A committed change together with the state it produced.
///
/// Listeners such as sound or haptics react to these; they never write back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Kind of change.
    pub kind: ChangeKind,
    /// State immediately after the change.
    pub snapshot: SessionSnapshot,
}

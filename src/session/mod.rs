//! Game session: lifecycle state machine and engine-move coordination.

mod controller;
mod coordinator;
mod events;
mod settings;
mod state;

pub use controller::{DEFAULT_REQUEST_TIMEOUT, GameController, MoveOutcome};
pub use coordinator::{EngineTurn, Reconciliation};
pub use events::{ChangeKind, SessionEvent};
pub use settings::{ConfigValidationError, EngineLevel, SearchBudget};
pub use state::{GameStatus, MoveRejected, SessionSnapshot};

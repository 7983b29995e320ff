//! Strictly Chess library - a chess session against a remote move engine
//!
//! One human plays one game against a move-inference service reached over
//! HTTP. The controller keeps the authoritative position, accepts only legal
//! moves, and guarantees that an engine answer is committed only if it still
//! belongs to the game and turn it was requested for.
//!
//! # Architecture
//!
//! - **Rules**: legality gate over a chess position (`shakmaty` backed)
//! - **History**: move list, captured pieces, last-move squares
//! - **Inference**: request/response types and the HTTP client
//! - **Session**: lifecycle state machine and engine-move coordination
//!
//! # Example
//!
//! ```no_run
//! use strictly_chess::{Color, ControllerConfig, EngineLevel, GameController, SearchBudget};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let controller = GameController::from_config(&ControllerConfig::default())?;
//! controller.start_new_game(Color::White, EngineLevel::default(), SearchBudget::default())?;
//!
//! let outcome = controller.make_move("e2", "e4", None)?;
//! if let Some(turn) = outcome.engine_turn {
//!     turn.settled().await;
//! }
//! println!("{:?}", controller.snapshot().move_history());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod history;
mod inference;
mod rules;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ControllerConfig, SERVICE_URL_ENV};

// Crate-level exports - Rules engine
pub use rules::{
    AppliedMove, Color, IllegalMoveError, InvalidNotationError, LastMove, MoveCandidate,
    PieceKind, RulesEngine, StandardRules,
};

// Crate-level exports - History
pub use history::{CapturedPieces, HistoryTracker};

// Crate-level exports - Inference
pub use inference::{
    HealthStatus, HttpInferenceClient, InferenceError, InferenceErrorKind, MoveInference,
    MoveRequest, MoveResponse,
};

// Crate-level exports - Session
pub use session::{
    ChangeKind, ConfigValidationError, DEFAULT_REQUEST_TIMEOUT, EngineLevel, EngineTurn,
    GameController, GameStatus, MoveOutcome, MoveRejected, Reconciliation, SearchBudget,
    SessionEvent, SessionSnapshot,
};

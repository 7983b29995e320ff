//! Rules-engine adapter: the single legality gate for a chess position.

mod standard;
mod types;

pub use standard::StandardRules;
pub use types::{
    AppliedMove, Color, IllegalMoveError, InvalidNotationError, LastMove, MoveCandidate,
    PieceKind,
};

/// Capability surface of a chess rules engine.
///
/// The session owns exactly one implementation and never inspects raw
/// position state; every mutation goes through [`apply_move`](Self::apply_move)
/// or [`reset`](Self::reset).
pub trait RulesEngine: Send + std::fmt::Debug {
    /// Serialized position (FEN).
    fn current_notation(&self) -> String;

    /// Side whose turn it is.
    fn side_to_move(&self) -> Color;

    /// Validates and commits a move.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] without touching the position when the
    /// move is malformed or not legal here.
    fn apply_move(&mut self, candidate: &MoveCandidate) -> Result<AppliedMove, IllegalMoveError>;

    /// The side to move is checkmated.
    fn is_checkmate(&self) -> bool;

    /// The side to move has no legal moves and is not in check.
    fn is_stalemate(&self) -> bool;

    /// The game is drawn by rule (material, fifty moves, repetition).
    fn is_draw(&self) -> bool;

    /// Resets to the standard start, or to `starting_notation` when given.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotationError`] and keeps the current position when the
    /// notation cannot be loaded.
    fn reset(&mut self, starting_notation: Option<&str>) -> Result<(), InvalidNotationError>;
}

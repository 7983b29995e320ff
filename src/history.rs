//! Move history and captured-piece bookkeeping derived from applied plies.

use crate::rules::{AppliedMove, Color, LastMove, PieceKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Pieces removed from the board, grouped by the color they belonged to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPieces {
    /// White pieces captured by black, in capture order.
    pub white: Vec<PieceKind>,
    /// Black pieces captured by white, in capture order.
    pub black: Vec<PieceKind>,
}

impl CapturedPieces {
    /// Captured pieces belonging to `color`.
    pub fn of(&self, color: Color) -> &[PieceKind] {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn push(&mut self, color: Color, piece: PieceKind) {
        match color {
            Color::White => self.white.push(piece),
            Color::Black => self.black.push(piece),
        }
    }
}

/// Append-only record of the plies applied in the current game.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    moves: Vec<String>,
    captured: CapturedPieces,
    last_move: Option<LastMove>,
}

impl HistoryTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one applied ply by `mover`.
    #[instrument(skip(self, applied), fields(notation = %applied.notation))]
    pub fn record(&mut self, mover: Color, applied: &AppliedMove) {
        self.moves.push(applied.notation.clone());
        if let Some(piece) = applied.captured {
            debug!(?piece, owner = %mover.opponent(), "Piece captured");
            self.captured.push(mover.opponent(), piece);
        }
        self.last_move = Some(applied.last_move());
    }

    /// Forgets everything; used when a new game starts.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Move notations in play order.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Captured pieces by owner.
    pub fn captured(&self) -> &CapturedPieces {
        &self.captured
    }

    /// Squares of the most recent ply.
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }
}

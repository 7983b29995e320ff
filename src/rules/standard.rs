//! Rules engine backed by shakmaty.

use super::types::{AppliedMove, Color, IllegalMoveError, InvalidNotationError, MoveCandidate};
use super::RulesEngine;
use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, EnPassantMode, Position,
};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Halfmove clock value at which the fifty-move rule applies.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Number of occurrences of one position that draws the game.
const REPETITION_LIMIT: u32 = 3;

/// Standard chess rules.
///
/// Tracks how often each position has occurred since the last reset so that
/// threefold repetition can be reported by [`RulesEngine::is_draw`].
#[derive(Debug, Clone)]
pub struct StandardRules {
    position: Chess,
    seen: HashMap<String, u32>,
}

impl StandardRules {
    /// Creates an engine at the standard starting position.
    #[instrument]
    pub fn new() -> Self {
        let mut rules = Self {
            position: Chess::default(),
            seen: HashMap::new(),
        };
        rules.remember_position();
        rules
    }

    /// Creates an engine from a FEN string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotationError`] if the FEN does not describe a legal position.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, InvalidNotationError> {
        let mut rules = Self::new();
        rules.reset(Some(fen))?;
        Ok(rules)
    }

    fn parse_position(notation: &str) -> Result<Chess, InvalidNotationError> {
        let fen: Fen = notation
            .parse()
            .map_err(|e| InvalidNotationError::new(notation, format!("{e}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| InvalidNotationError::new(notation, format!("{e}")))
    }

    /// Position identity for repetition: placement, side, castling, en passant.
    fn repetition_key(&self) -> String {
        self.current_notation()
            .split(' ')
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn remember_position(&mut self) {
        let key = self.repetition_key();
        *self.seen.entry(key).or_insert(0) += 1;
    }

    fn is_repetition(&self) -> bool {
        self.seen
            .get(&self.repetition_key())
            .is_some_and(|count| *count >= REPETITION_LIMIT)
    }
}

impl Default for StandardRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for StandardRules {
    fn current_notation(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn side_to_move(&self) -> Color {
        self.position.turn().into()
    }

    #[instrument(skip(self), fields(candidate = %candidate))]
    fn apply_move(&mut self, candidate: &MoveCandidate) -> Result<AppliedMove, IllegalMoveError> {
        if let Some(kind) = candidate
            .promotion()
            .filter(|kind| kind.promotion_char().is_none())
        {
            warn!(%kind, "Promotion to a piece that cannot be promoted to");
            return Err(IllegalMoveError::new(format!(
                "malformed promotion to {} in '{}{}'",
                kind,
                candidate.from(),
                candidate.to()
            )));
        }

        let uci: UciMove = candidate.to_string().parse().map_err(|_| {
            warn!("Unparseable coordinate move");
            IllegalMoveError::new(format!("malformed move '{}'", candidate))
        })?;

        let m = uci.to_move(&self.position).map_err(|_| {
            warn!("Move rejected by rules");
            IllegalMoveError::new(format!("illegal move '{}'", candidate))
        })?;

        if !self.position.is_legal(&m) {
            warn!("Move rejected by rules");
            return Err(IllegalMoveError::new(format!("illegal move '{}'", candidate)));
        }

        // Castling is reported king-to-destination, not king-to-rook.
        let normalized = UciMove::from_move(&m, CastlingMode::Standard).to_string();
        let (from, to) = (normalized[0..2].to_string(), normalized[2..4].to_string());
        let captured = m.capture().map(Into::into);
        let promotion = m.promotion().map(Into::into);

        let notation = SanPlus::from_move_and_play_unchecked(&mut self.position, &m).to_string();
        self.remember_position();

        debug!(notation = %notation, ?captured, "Move applied");
        Ok(AppliedMove {
            notation,
            from,
            to,
            promotion,
            captured,
        })
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_insufficient_material()
            || self.position.halfmoves() >= FIFTY_MOVE_PLIES
            || self.is_repetition()
    }

    #[instrument(skip(self))]
    fn reset(&mut self, starting_notation: Option<&str>) -> Result<(), InvalidNotationError> {
        let position = match starting_notation {
            Some(notation) => Self::parse_position(notation)?,
            None => Chess::default(),
        };
        self.position = position;
        self.seen.clear();
        self.remember_position();
        debug!(fen = %self.current_notation(), "Position reset");
        Ok(())
    }
}

//! Domain types exchanged across the rules-engine boundary.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Side in a chess game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Color {
    /// White pieces (moves first from the standard start).
    White,
    /// Black pieces.
    Black,
}

impl Color {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl From<shakmaty::Color> for Color {
    fn from(c: shakmaty::Color) -> Self {
        match c {
            shakmaty::Color::White => Self::White,
            shakmaty::Color::Black => Self::Black,
        }
    }
}

/// Kind of chess piece.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceKind {
    /// Single-letter promotion suffix used in coordinate notation.
    pub fn promotion_char(self) -> Option<char> {
        match self {
            PieceKind::Knight => Some('n'),
            PieceKind::Bishop => Some('b'),
            PieceKind::Rook => Some('r'),
            PieceKind::Queen => Some('q'),
            PieceKind::Pawn | PieceKind::King => None,
        }
    }

    /// Parses a promotion suffix (`q`, `r`, `b`, `n`).
    pub fn from_promotion_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            _ => None,
        }
    }
}

impl From<shakmaty::Role> for PieceKind {
    fn from(r: shakmaty::Role) -> Self {
        match r {
            shakmaty::Role::Pawn => Self::Pawn,
            shakmaty::Role::Knight => Self::Knight,
            shakmaty::Role::Bishop => Self::Bishop,
            shakmaty::Role::Rook => Self::Rook,
            shakmaty::Role::Queen => Self::Queen,
            shakmaty::Role::King => Self::King,
        }
    }
}

/// A requested move in coordinate form: origin, destination, optional promotion.
///
/// Construction only checks shape. Legality is decided by
/// [`RulesEngine::apply_move`](super::RulesEngine::apply_move).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveCandidate {
    from: String,
    to: String,
    promotion: Option<PieceKind>,
}

impl MoveCandidate {
    /// Creates a candidate from square names such as `"e2"` and `"e4"`.
    pub fn new(from: impl Into<String>, to: impl Into<String>, promotion: Option<PieceKind>) -> Self {
        Self {
            from: from.into().to_ascii_lowercase(),
            to: to.into().to_ascii_lowercase(),
            promotion,
        }
    }

    /// Parses coordinate notation like `e2e4` or `e7e8q`.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] when the text is not a well-formed coordinate move.
    #[track_caller]
    #[instrument]
    pub fn from_uci(text: &str) -> Result<Self, IllegalMoveError> {
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(IllegalMoveError::new(format!(
                "malformed coordinate move '{}'",
                text
            )));
        }

        let (from, rest) = text.split_at(2);
        let (to, suffix) = rest.split_at(2);
        if !is_square_name(from) || !is_square_name(to) {
            return Err(IllegalMoveError::new(format!(
                "malformed coordinate move '{}'",
                text
            )));
        }

        let promotion = match suffix.chars().next() {
            None => None,
            Some(c) => Some(PieceKind::from_promotion_char(c).ok_or_else(|| {
                IllegalMoveError::new(format!("malformed promotion in '{}'", text))
            })?),
        };

        Ok(Self::new(from, to, promotion))
    }

    /// Origin square name.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Destination square name.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Requested promotion piece, if any.
    pub fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }
}

impl std::fmt::Display for MoveCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(c) = self.promotion.and_then(PieceKind::promotion_char) {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

fn is_square_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2
        && (b'a'..=b'h').contains(&bytes[0].to_ascii_lowercase())
        && (b'1'..=b'8').contains(&bytes[1])
}

/// Origin and destination of the most recently applied ply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastMove {
    /// Origin square.
    pub from: String,
    /// Destination square.
    pub to: String,
}

/// Result of a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    /// Standard algebraic notation, including check and mate suffixes.
    pub notation: String,
    /// Origin square.
    pub from: String,
    /// Destination square (king destination for castling).
    pub to: String,
    /// Promotion piece, if the move promoted.
    pub promotion: Option<PieceKind>,
    /// Piece kind removed from the board, if the move captured.
    pub captured: Option<PieceKind>,
}

impl AppliedMove {
    /// Origin/destination pair for highlighting.
    pub fn last_move(&self) -> LastMove {
        LastMove {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// A move was rejected by the rules engine. The position is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Illegal move: {} at {}:{}", message, file, line)]
pub struct IllegalMoveError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl IllegalMoveError {
    /// Creates a new illegal move error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// A position notation could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Invalid position '{}': {} at {}:{}", notation, message, file, line)]
pub struct InvalidNotationError {
    /// The rejected notation.
    pub notation: String,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl InvalidNotationError {
    /// Creates a new notation error with caller location tracking.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn new(notation: impl Into<String>, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            notation: notation.into(),
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_move() {
        let m = MoveCandidate::from_uci("e2e4").unwrap();
        assert_eq!(m.from(), "e2");
        assert_eq!(m.to(), "e4");
        assert_eq!(m.promotion(), None);
        assert_eq!(m.to_string(), "e2e4");
    }

    #[test]
    fn test_parse_promotion() {
        let m = MoveCandidate::from_uci("a7a8Q").unwrap();
        assert_eq!(m.promotion(), Some(PieceKind::Queen));
        assert_eq!(m.to_string(), "a7a8q");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(MoveCandidate::from_uci("").is_err());
        assert!(MoveCandidate::from_uci("e2").is_err());
        assert!(MoveCandidate::from_uci("i2e4").is_err());
        assert!(MoveCandidate::from_uci("e2e9").is_err());
        assert!(MoveCandidate::from_uci("e7e8k").is_err());
        assert!(MoveCandidate::from_uci("e2e4e5").is_err());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
        assert_eq!("Black".parse::<Color>().unwrap(), Color::Black);
        assert_eq!(Color::White.to_string(), "white");
        assert_eq!(Color::White.opponent(), Color::Black);
    }

    #[test]
    fn test_error_records_location() {
        let err = IllegalMoveError::new("nope");
        assert_eq!(err.message, "nope");
        assert!(err.file.ends_with("types.rs"));
    }
}

//! Session state, its read-only snapshot, and synchronous rejection reasons.

use super::coordinator::Dispatch;
use super::events::{ChangeKind, SessionEvent};
use super::settings::{EngineLevel, SearchBudget};
use crate::history::{CapturedPieces, HistoryTracker};
use crate::inference::MoveRequest;
use crate::rules::{AppliedMove, Color, IllegalMoveError, LastMove, RulesEngine};
use derive_getters::Getters;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// No game started yet.
    Waiting,
    /// Moves are being played.
    Playing,
    /// The side to move is mated.
    Checkmate,
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// Drawn by rule.
    Draw,
    /// The human resigned.
    Resigned,
}

impl GameStatus {
    /// Terminal statuses absorb every move until the next game.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw | GameStatus::Resigned
        )
    }
}

/// Why a synchronous session operation was refused. State is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveRejected {
    /// The game is not in progress.
    #[display("Game is not in progress (status: {})", _0)]
    NotPlaying(GameStatus),
    /// It is the engine's turn.
    #[display("It is not the player's turn")]
    NotPlayerTurn,
    /// An engine request is outstanding.
    #[display("The engine is thinking")]
    EngineThinking,
    /// No failed engine request to re-issue.
    #[display("There is no failed engine request to retry")]
    NothingToRetry,
    /// The rules engine refused the move.
    #[display("{}", _0)]
    Illegal(IllegalMoveError),
}

impl std::error::Error for MoveRejected {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MoveRejected::Illegal(e) => Some(e),
            _ => None,
        }
    }
}

/// Read-only copy of the session, taken atomically.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Lifecycle status.
    status: GameStatus,
    /// Side the human plays.
    player_color: Color,
    /// Skill rating for the next request.
    engine_level: EngineLevel,
    /// Node budget for the next request.
    search_budget: SearchBudget,
    /// The human may move now.
    is_player_turn: bool,
    /// An engine request is outstanding.
    is_thinking: bool,
    /// Move notations since the game started.
    move_history: Vec<String>,
    /// Captured pieces by owner.
    captured_pieces: CapturedPieces,
    /// Squares of the most recent ply.
    last_move: Option<LastMove>,
    /// Status is terminal.
    is_game_over: bool,
    /// Winner after checkmate or resignation.
    winner: Option<Color>,
    /// Incremented on every new game and resignation.
    generation: u64,
    /// Last failure, if not cleared.
    error: Option<String>,
    /// Current position (FEN).
    position: String,
}

/// Authoritative session state. Only ever touched under the controller's lock.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) rules: Box<dyn RulesEngine>,
    pub(crate) history: HistoryTracker,
    pub(crate) status: GameStatus,
    pub(crate) player_color: Color,
    pub(crate) engine_level: EngineLevel,
    pub(crate) search_budget: SearchBudget,
    pub(crate) is_player_turn: bool,
    pub(crate) is_thinking: bool,
    pub(crate) winner: Option<Color>,
    pub(crate) generation: u64,
    pub(crate) error: Option<String>,
    /// Ticket of the one request allowed to commit.
    pub(crate) pending: Option<u64>,
    /// Last request sent, kept for retry.
    pub(crate) last_request: Option<MoveRequest>,
    next_ticket: u64,
    observers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionState {
    pub(crate) fn new(rules: Box<dyn RulesEngine>) -> Self {
        Self {
            rules,
            history: HistoryTracker::new(),
            status: GameStatus::Waiting,
            player_color: Color::White,
            engine_level: EngineLevel::default(),
            search_budget: SearchBudget::default(),
            is_player_turn: false,
            is_thinking: false,
            winner: None,
            generation: 0,
            error: None,
            pending: None,
            last_request: None,
            next_ticket: 0,
            observers: Vec::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            player_color: self.player_color,
            engine_level: self.engine_level,
            search_budget: self.search_budget,
            is_player_turn: self.is_player_turn,
            is_thinking: self.is_thinking,
            move_history: self.history.moves().to_vec(),
            captured_pieces: self.history.captured().clone(),
            last_move: self.history.last_move().cloned(),
            is_game_over: self.status.is_terminal(),
            winner: self.winner,
            generation: self.generation,
            error: self.error.clone(),
            position: self.rules.current_notation(),
        }
    }

    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    /// Publishes the committed state to every live subscriber.
    pub(crate) fn notify(&mut self, kind: ChangeKind) {
        if self.observers.is_empty() {
            return;
        }
        let event = SessionEvent {
            kind,
            snapshot: self.snapshot(),
        };
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
        debug!(?kind, subscribers = self.observers.len(), "Published session event");
    }

    /// Feeds an applied ply to the history tracker.
    pub(crate) fn record_ply(&mut self, mover: Color, applied: &AppliedMove) {
        self.history.record(mover, applied);
    }

    /// Moves to a terminal status if the position demands it.
    ///
    /// Returns `true` when the game ended.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub(crate) fn settle_terminal(&mut self) -> bool {
        let to_move = self.rules.side_to_move();
        let status = if self.rules.is_checkmate() {
            self.winner = Some(to_move.opponent());
            GameStatus::Checkmate
        } else if self.rules.is_stalemate() {
            GameStatus::Stalemate
        } else if self.rules.is_draw() {
            GameStatus::Draw
        } else {
            return false;
        };

        self.status = status;
        self.is_thinking = false;
        self.pending = None;
        info!(%status, winner = ?self.winner, "Game over");
        true
    }

    /// Marks a request as outstanding and returns what the coordinator sends.
    pub(crate) fn begin_request(&mut self) -> Dispatch {
        let request = MoveRequest {
            position: self.rules.current_notation(),
            level: self.engine_level.get(),
            nodes: self.search_budget.get(),
        };
        self.last_request = Some(request.clone());
        self.dispatch(request)
    }

    /// Marks `request` as outstanding under a fresh ticket.
    pub(crate) fn dispatch(&mut self, request: MoveRequest) -> Dispatch {
        self.next_ticket += 1;
        self.pending = Some(self.next_ticket);
        self.is_thinking = true;
        self.is_player_turn = false;
        Dispatch {
            generation: self.generation,
            ticket: self.next_ticket,
            request,
        }
    }

    /// Whether a settled request may still commit.
    pub(crate) fn accepts(&self, generation: u64, ticket: u64) -> bool {
        self.generation == generation && self.pending == Some(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardRules;

    #[test]
    fn test_new_state_is_waiting() {
        let state = SessionState::new(Box::new(StandardRules::new()));
        let snap = state.snapshot();
        assert_eq!(*snap.status(), GameStatus::Waiting);
        assert!(!snap.is_player_turn());
        assert!(!snap.is_thinking());
        assert!(!snap.is_game_over());
        assert_eq!(*snap.generation(), 0);
    }

    #[test]
    fn test_dispatch_tickets_are_unique() {
        let mut state = SessionState::new(Box::new(StandardRules::new()));
        let first = state.begin_request();
        let second = state.begin_request();
        assert_ne!(first.ticket, second.ticket);
        assert!(!state.accepts(first.generation, first.ticket));
        assert!(state.accepts(second.generation, second.ticket));
        assert_eq!(state.last_request.as_ref(), Some(&second.request));
    }

    #[test]
    fn test_settle_terminal_checkmate_winner() {
        // Black just delivered fool's mate; white to move
        let rules = StandardRules::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        let mut state = SessionState::new(Box::new(rules));
        state.status = GameStatus::Playing;
        assert!(state.settle_terminal());
        assert_eq!(state.status, GameStatus::Checkmate);
        assert_eq!(state.winner, Some(Color::Black));
    }

    #[test]
    fn test_status_terminal_set() {
        assert!(!GameStatus::Waiting.is_terminal());
        assert!(!GameStatus::Playing.is_terminal());
        assert!(GameStatus::Checkmate.is_terminal());
        assert!(GameStatus::Stalemate.is_terminal());
        assert!(GameStatus::Draw.is_terminal());
        assert!(GameStatus::Resigned.is_terminal());
        assert_eq!(GameStatus::Checkmate.to_string(), "checkmate");
    }

    #[test]
    fn test_notify_prunes_closed_subscribers() {
        let mut state = SessionState::new(Box::new(StandardRules::new()));
        let mut live = state.subscribe();
        let dropped = state.subscribe();
        drop(dropped);

        state.notify(ChangeKind::SettingsChanged);
        assert_eq!(state.observers.len(), 1);
        let event = live.try_recv().unwrap();
        assert_eq!(event.kind, ChangeKind::SettingsChanged);
    }
}

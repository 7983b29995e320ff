//! Game session state machine.

use super::coordinator::EngineTurn;
use super::events::{ChangeKind, SessionEvent};
use super::settings::{ConfigValidationError, EngineLevel, SearchBudget};
use super::state::{GameStatus, MoveRejected, SessionSnapshot, SessionState};
use crate::config::ControllerConfig;
use crate::inference::{HttpInferenceClient, InferenceError, MoveInference};
use crate::rules::{
    AppliedMove, Color, InvalidNotationError, MoveCandidate, PieceKind, RulesEngine,
    StandardRules,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Deadline for one engine request unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of an accepted human move.
#[derive(Debug)]
pub struct MoveOutcome {
    /// The committed move.
    pub applied: AppliedMove,
    /// The engine's reply in flight, unless the move ended the game.
    pub engine_turn: Option<EngineTurn>,
}

/// Owns one chess game against the inference service.
///
/// Cloning yields another handle to the same session. Operations that issue
/// an engine request spawn onto the current Tokio runtime and must be called
/// from within one.
#[derive(Debug, Clone)]
pub struct GameController {
    state: Arc<Mutex<SessionState>>,
    inference: Arc<dyn MoveInference>,
    request_timeout: Duration,
}

impl GameController {
    /// Creates a controller in the `Waiting` state.
    #[instrument(skip_all)]
    pub fn new(rules: Box<dyn RulesEngine>, inference: Arc<dyn MoveInference>) -> Self {
        info!("Creating game controller");
        Self {
            state: Arc::new(Mutex::new(SessionState::new(rules))),
            inference,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Builds a controller with standard rules and the HTTP inference client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    #[instrument(skip(config), fields(service_url = %config.service_url()))]
    pub fn from_config(config: &ControllerConfig) -> Result<Self, InferenceError> {
        let client = HttpInferenceClient::new(config.service_url(), config.request_timeout())?;
        Ok(Self::new(Box::new(StandardRules::new()), Arc::new(client))
            .with_request_timeout(config.request_timeout()))
    }

    /// Overrides the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn inference(&self) -> &dyn MoveInference {
        self.inference.as_ref()
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Receives one event per committed change from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.lock().subscribe()
    }

    /// Starts a game from the standard position.
    ///
    /// Returns the engine's opening request when the human plays black.
    ///
    /// # Errors
    ///
    /// Only fails if the rules engine cannot load the starting position.
    #[instrument(skip(self))]
    pub fn start_new_game(
        &self,
        color: Color,
        level: EngineLevel,
        budget: SearchBudget,
    ) -> Result<Option<EngineTurn>, InvalidNotationError> {
        self.begin_game(None, color, level, budget)
    }

    /// Starts a game from a FEN position.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNotationError`] and leaves the session untouched if the
    /// FEN cannot be loaded.
    #[instrument(skip(self))]
    pub fn start_new_game_from(
        &self,
        notation: &str,
        color: Color,
        level: EngineLevel,
        budget: SearchBudget,
    ) -> Result<Option<EngineTurn>, InvalidNotationError> {
        self.begin_game(Some(notation), color, level, budget)
    }

    fn begin_game(
        &self,
        notation: Option<&str>,
        color: Color,
        level: EngineLevel,
        budget: SearchBudget,
    ) -> Result<Option<EngineTurn>, InvalidNotationError> {
        let mut state = self.lock();
        state.rules.reset(notation)?;

        state.generation += 1;
        state.history.clear();
        state.error = None;
        state.winner = None;
        state.pending = None;
        state.last_request = None;
        state.is_thinking = false;
        state.player_color = color;
        state.engine_level = level;
        state.search_budget = budget;
        state.status = GameStatus::Playing;
        state.is_player_turn = state.rules.side_to_move() == color;

        info!(
            generation = state.generation,
            %color,
            %level,
            %budget,
            "New game started"
        );

        let dispatch = if !state.settle_terminal() && !state.is_player_turn {
            Some(state.begin_request())
        } else {
            None
        };
        state.notify(ChangeKind::NewGame);
        drop(state);

        Ok(dispatch.map(|d| self.dispatch_request(d)))
    }

    /// Plays the human's move and, if the game continues, asks the engine to reply.
    ///
    /// # Errors
    ///
    /// Returns [`MoveRejected`] without changing anything when no game is in
    /// progress, it is not the human's turn, the engine is thinking, or the
    /// move is illegal.
    #[instrument(skip(self))]
    pub fn make_move(
        &self,
        from: &str,
        to: &str,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, MoveRejected> {
        let candidate = MoveCandidate::new(from, to, promotion);
        let mut state = self.lock();

        if state.status != GameStatus::Playing {
            warn!(status = %state.status, "Move outside of a game");
            return Err(MoveRejected::NotPlaying(state.status));
        }
        if state.is_thinking {
            warn!("Move while engine is thinking");
            return Err(MoveRejected::EngineThinking);
        }
        if !state.is_player_turn {
            warn!("Move out of turn");
            return Err(MoveRejected::NotPlayerTurn);
        }

        let applied = state
            .rules
            .apply_move(&candidate)
            .map_err(MoveRejected::Illegal)?;

        let mover = state.player_color;
        state.record_ply(mover, &applied);
        state.is_player_turn = false;
        info!(notation = %applied.notation, "Player move committed");

        let dispatch = if state.settle_terminal() {
            None
        } else {
            Some(state.begin_request())
        };
        state.notify(ChangeKind::PlayerMoved);
        drop(state);

        Ok(MoveOutcome {
            applied,
            engine_turn: dispatch.map(|d| self.dispatch_request(d)),
        })
    }

    /// Resigns the current game for the human.
    ///
    /// Any engine answer still in flight is discarded when it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`MoveRejected::NotPlaying`] unless a game is in progress.
    #[instrument(skip(self))]
    pub fn resign_game(&self) -> Result<(), MoveRejected> {
        let mut state = self.lock();
        if state.status != GameStatus::Playing {
            warn!(status = %state.status, "Resign outside of a game");
            return Err(MoveRejected::NotPlaying(state.status));
        }

        state.status = GameStatus::Resigned;
        state.winner = Some(state.player_color.opponent());
        state.generation += 1;
        state.is_thinking = false;
        state.is_player_turn = false;
        state.pending = None;
        info!(generation = state.generation, winner = ?state.winner, "Player resigned");
        state.notify(ChangeKind::Resigned);
        Ok(())
    }

    /// Changes the engine's skill rating for future requests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::EngineLevel`] for values outside
    /// 1100..=1900 in steps of 100.
    #[instrument(skip(self))]
    pub fn set_engine_level(&self, value: u32) -> Result<(), ConfigValidationError> {
        let level = EngineLevel::new(value)?;
        let mut state = self.lock();
        state.engine_level = level;
        debug!(%level, "Engine level updated");
        state.notify(ChangeKind::SettingsChanged);
        Ok(())
    }

    /// Changes the node budget for future requests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::SearchBudget`] for values outside 1..=10000.
    #[instrument(skip(self))]
    pub fn set_search_budget(&self, value: u32) -> Result<(), ConfigValidationError> {
        let budget = SearchBudget::new(value)?;
        let mut state = self.lock();
        state.search_budget = budget;
        debug!(%budget, "Search budget updated");
        state.notify(ChangeKind::SettingsChanged);
        Ok(())
    }

    /// Clears the last error.
    #[instrument(skip(self))]
    pub fn clear_error(&self) {
        let mut state = self.lock();
        if state.error.take().is_some() {
            state.notify(ChangeKind::ErrorCleared);
        }
    }

    /// Re-sends the last engine request after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`MoveRejected`] unless the game is in progress, the engine
    /// owes a move, and no request is outstanding.
    #[instrument(skip(self))]
    pub fn retry_engine_move(&self) -> Result<EngineTurn, MoveRejected> {
        let mut state = self.lock();
        if state.status != GameStatus::Playing {
            return Err(MoveRejected::NotPlaying(state.status));
        }
        if state.is_thinking {
            return Err(MoveRejected::EngineThinking);
        }
        if state.is_player_turn {
            return Err(MoveRejected::NothingToRetry);
        }
        let request = state
            .last_request
            .clone()
            .ok_or(MoveRejected::NothingToRetry)?;

        let dispatch = state.dispatch(request);
        info!(generation = state.generation, "Retrying engine request");
        state.notify(ChangeKind::RetryIssued);
        drop(state);

        Ok(self.dispatch_request(dispatch))
    }
}

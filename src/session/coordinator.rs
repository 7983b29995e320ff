//! Move coordinator: issues engine requests and reconciles their answers.
//!
//! A request carries the generation it was issued under and a ticket. When it
//! settles, the answer is committed only if both still match the session;
//! otherwise it is dropped without touching state. The network call itself
//! runs outside the session lock.

use super::controller::GameController;
use super::events::ChangeKind;
use crate::inference::{InferenceError, MoveRequest, MoveResponse};
use crate::rules::MoveCandidate;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

/// An outstanding request as handed to the coordinator.
#[derive(Debug, Clone)]
pub(crate) struct Dispatch {
    pub(crate) generation: u64,
    pub(crate) ticket: u64,
    pub(crate) request: MoveRequest,
}

/// How a settled engine request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Reconciliation {
    /// The engine's move was committed.
    Applied,
    /// The request failed; the session's error field says why.
    Failed,
    /// The session moved on; the answer was ignored.
    Discarded,
    /// The request task died before reconciling.
    Aborted,
}

/// Handle to an in-flight engine request.
///
/// Awaiting [`settled`](Self::settled) is optional; dropping the handle does
/// not cancel the request.
#[derive(Debug)]
pub struct EngineTurn {
    generation: u64,
    handle: JoinHandle<Reconciliation>,
}

impl EngineTurn {
    /// Generation the request was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits until the answer has been reconciled with the session.
    pub async fn settled(self) -> Reconciliation {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, generation = self.generation, "Engine request task failed");
                Reconciliation::Aborted
            }
        }
    }
}

impl GameController {
    /// Sends `dispatch` to the inference service on a background task.
    pub(crate) fn dispatch_request(&self, dispatch: Dispatch) -> EngineTurn {
        let controller = self.clone();
        let generation = dispatch.generation;
        let span = info_span!(
            "engine_turn",
            generation = dispatch.generation,
            ticket = dispatch.ticket
        );

        debug!(
            generation,
            level = dispatch.request.level,
            nodes = dispatch.request.nodes,
            "Dispatching engine request"
        );
        let handle = tokio::spawn(
            async move {
                let outcome = controller.ask_engine(&dispatch.request).await;
                controller.reconcile(&dispatch, outcome)
            }
            .instrument(span),
        );

        EngineTurn { generation, handle }
    }

    /// Calls the service under the request deadline.
    async fn ask_engine(&self, request: &MoveRequest) -> Result<MoveResponse, InferenceError> {
        let deadline = self.request_timeout();
        match tokio::time::timeout(deadline, self.inference().request_move(request)).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::timeout(format!(
                "No answer within {:?}",
                deadline
            ))),
        }
    }

    /// Commits a settled answer if it still belongs to the current exchange.
    #[instrument(skip(self, dispatch, outcome))]
    pub(crate) fn reconcile(
        &self,
        dispatch: &Dispatch,
        outcome: Result<MoveResponse, InferenceError>,
    ) -> Reconciliation {
        let mut state = self.lock();

        if !state.accepts(dispatch.generation, dispatch.ticket) {
            debug!(
                current_generation = state.generation,
                "Discarding stale engine response"
            );
            return Reconciliation::Discarded;
        }

        state.pending = None;
        state.is_thinking = false;

        let applied = match outcome {
            Ok(response) => match MoveCandidate::from_uci(&response.chosen) {
                Ok(candidate) => state.rules.apply_move(&candidate).map_err(|e| {
                    InferenceError::malformed(format!(
                        "'{}' is not legal here: {}",
                        response.chosen, e.message
                    ))
                }),
                Err(e) => Err(InferenceError::malformed(format!(
                    "'{}' is not a coordinate move: {}",
                    response.chosen, e.message
                ))),
            },
            Err(e) => Err(e),
        };

        match applied {
            Ok(applied) => {
                let engine_color = state.player_color.opponent();
                state.record_ply(engine_color, &applied);
                state.is_player_turn = true;
                state.error = None;
                info!(notation = %applied.notation, "Engine move committed");
                state.settle_terminal();
                state.notify(ChangeKind::EngineMoved);
                Reconciliation::Applied
            }
            Err(e) => {
                warn!(error = %e, "Engine turn failed; waiting for retry or new game");
                state.error = Some(e.summary());
                state.notify(ChangeKind::EngineFailed);
                Reconciliation::Failed
            }
        }
    }
}

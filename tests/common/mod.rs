//! Inference doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use strictly_chess::{
    GameController, InferenceError, MoveInference, MoveRequest, MoveResponse, StandardRules,
};
use tokio::sync::oneshot;

/// A successful answer carrying `uci`.
pub fn answer(uci: &str) -> Result<MoveResponse, InferenceError> {
    Ok(MoveResponse {
        chosen: uci.to_string(),
        level: None,
        nodes: None,
    })
}

/// Returns queued answers in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    answers: Mutex<VecDeque<Result<MoveResponse, InferenceError>>>,
    requests: Mutex<Vec<MoveRequest>>,
}

impl ScriptedEngine {
    /// Engine that will play `moves` in order.
    pub fn playing(moves: &[&str]) -> Arc<Self> {
        let engine = Self::default();
        for uci in moves {
            engine.push(answer(uci));
        }
        Arc::new(engine)
    }

    /// Queues another answer.
    pub fn push(&self, answer: Result<MoveResponse, InferenceError>) {
        self.answers.lock().expect("answers lock").push_back(answer);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<MoveRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait::async_trait]
impl MoveInference for ScriptedEngine {
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, InferenceError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::transport("script exhausted")))
    }
}

/// Holds each request open until the test releases it.
#[derive(Debug, Default)]
pub struct GatedEngine {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<MoveResponse, InferenceError>>>>,
}

impl GatedEngine {
    /// Creates an engine with no gates.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a gate for the next request; send on the returned handle to answer it.
    pub fn gate(&self) -> oneshot::Sender<Result<MoveResponse, InferenceError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().expect("gates lock").push_back(rx);
        tx
    }
}

#[async_trait::async_trait]
impl MoveInference for GatedEngine {
    async fn request_move(&self, _request: &MoveRequest) -> Result<MoveResponse, InferenceError> {
        let gate = self.gates.lock().expect("gates lock").pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(InferenceError::transport("gate dropped"))),
            None => Err(InferenceError::transport("no gate queued")),
        }
    }
}

/// Controller over standard rules and the given engine.
pub fn controller(engine: Arc<dyn MoveInference>) -> GameController {
    GameController::new(Box::new(StandardRules::new()), engine)
}

//! Boundary to the remote move-inference service.

mod error;
mod http;

pub use error::{InferenceError, InferenceErrorKind};
pub use http::{HealthStatus, HttpInferenceClient};

use serde::{Deserialize, Serialize};

/// One request for an engine move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Position to move from (FEN).
    #[serde(rename = "fen")]
    pub position: String,
    /// Engine skill rating.
    pub level: u32,
    /// Search budget in nodes.
    pub nodes: u32,
}

/// A candidate move returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Coordinate move, e.g. `e7e5`.
    #[serde(rename = "move")]
    pub chosen: String,
    /// Skill rating the service used, when echoed.
    #[serde(default)]
    pub level: Option<u32>,
    /// Node budget the service used, when echoed.
    #[serde(default)]
    pub nodes: Option<u32>,
}

/// Something that can pick a move for a position.
///
/// Implementations must be stateless with respect to the session: all
/// context arrives in the [`MoveRequest`].
#[async_trait::async_trait]
pub trait MoveInference: Send + Sync + std::fmt::Debug {
    /// Requests one move.
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, InferenceError>;
}

// Events that flow through the TUI's single-consumer queue.
//
// Every source of change - keyboard, resize, completed API calls - is
// funneled into one mpsc channel as an AppEvent, so all state mutation is
// linearized in the event loop. Using enums allows pattern matching and
// makes the "stale result" check a simple tag comparison.

use crate::api::types::{Capsule, Decision, GraphStats, Identity, Memory, Task};
use crate::api::ApiError;
use crossterm::event::KeyEvent;

/// Everything the event loop can wake up on.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Api(ApiResponse),
}

/// Completion message of one async API command. Exactly one is sent per
/// dispatched command, success or failure.
#[derive(Debug)]
pub enum ApiResponse {
    /// Identity + org/project catalog (initial load after login)
    Bootstrap(Result<Identity, ApiError>),
    Decisions(Result<Vec<Decision>, ApiError>),
    Memories(Result<Vec<Memory>, ApiError>),
    Tasks(Result<Vec<Task>, ApiError>),
    Capsules(Result<Vec<Capsule>, ApiError>),
    GraphStats(Result<GraphStats, ApiError>),
    /// All four lists at once for the dashboard overview
    Dashboard(Result<DashboardData, ApiError>),
    /// Decisions + memories snapshot for the chat RAG context
    ChatContext(Result<ChatContextData, ApiError>),
    /// Full buffered assistant reply, tagged with the session that sent
    /// the question so replies to an abandoned session can be dropped
    ChatReply {
        session_id: String,
        result: Result<String, ApiError>,
    },
    /// A mutation (accept/deprecate/delete/toggle) finished; the kind says
    /// which list to refetch on success
    Mutation(MutationKind, Result<(), ApiError>),
}

impl ApiResponse {
    /// Tag used to match a completion against the screen that is still
    /// waiting for it; anything else is a stale result and gets dropped.
    pub fn kind(&self) -> ResponseKind {
        match self {
            ApiResponse::Bootstrap(_) => ResponseKind::Bootstrap,
            ApiResponse::Decisions(_) => ResponseKind::Decisions,
            ApiResponse::Memories(_) => ResponseKind::Memories,
            ApiResponse::Tasks(_) => ResponseKind::Tasks,
            ApiResponse::Capsules(_) => ResponseKind::Capsules,
            ApiResponse::GraphStats(_) => ResponseKind::GraphStats,
            ApiResponse::Dashboard(_) => ResponseKind::Dashboard,
            ApiResponse::ChatContext(_) => ResponseKind::ChatContext,
            ApiResponse::ChatReply { .. } => ResponseKind::ChatReply,
            ApiResponse::Mutation(kind, _) => ResponseKind::Mutation(*kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Bootstrap,
    Decisions,
    Memories,
    Tasks,
    Capsules,
    GraphStats,
    Dashboard,
    ChatContext,
    ChatReply,
    Mutation(MutationKind),
}

/// Which list a finished mutation belongs to (and should refetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Decision,
    Memory,
    Task,
}

#[derive(Debug)]
pub struct DashboardData {
    pub decisions: Vec<Decision>,
    pub memories: Vec<Memory>,
    pub tasks: Vec<Task>,
    pub capsules: Vec<Capsule>,
}

#[derive(Debug)]
pub struct ChatContextData {
    pub decisions: Vec<Decision>,
    pub memories: Vec<Memory>,
}

// Typed payloads for the decision-tracking REST API.
//
// These mirror the server's JSON schema. Status fields are proper enums so
// the state machine can pattern-match on lifecycle states instead of
// comparing strings; unknown values from newer servers fall back to a
// catch-all variant rather than failing the whole decode.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub organization_id: String,
}

/// Response of `GET /api/v1/me`: the user plus everything they can see.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub user: User,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

// ============================================================================
// Device-code auth
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthInit {
    pub code: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceAuthStatus {
    Pending,
    Complete,
    Expired,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthPoll {
    pub status: DeviceAuthStatus,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// ============================================================================
// Decisions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Draft,
    Pending,
    Accepted,
    Rejected,
    Deprecated,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Draft => "DRAFT",
            DecisionStatus::Pending => "PENDING",
            DecisionStatus::Accepted => "ACCEPTED",
            DecisionStatus::Rejected => "REJECTED",
            DecisionStatus::Deprecated => "DEPRECATED",
        }
    }

    /// Accept is only legal from DRAFT or PENDING.
    pub fn acceptable(&self) -> bool {
        matches!(self, DecisionStatus::Draft | DecisionStatus::Pending)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Decision {
    pub id: String,
    pub statement: String,
    #[serde(default)]
    pub rationale: String,
    pub status: DecisionStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub accepted_at: Option<String>,
    #[serde(default)]
    pub accepted_by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDecisionRequest {
    pub statement: String,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Response of `GET /api/v1/projects/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectStatus {
    pub project_id: String,
    pub total_decisions: u32,
    pub accepted: u32,
    pub pending: u32,
    pub draft: u32,
    pub deprecated: u32,
}

// ============================================================================
// Memories
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub decision_ids: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMemoryRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateMemoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
    /// Statuses this client doesn't know about yet.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Review => "REVIEW",
            TaskStatus::Done => "DONE",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }

    /// The toggle cycle used by the `t` shortcut:
    /// TODO -> IN_PROGRESS -> DONE -> TODO; anything else jumps to DONE.
    pub fn toggled(&self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
            _ => TaskStatus::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Unknown => "-",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    #[serde(default)]
    pub created_at: String,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

// ============================================================================
// Capsules & graph
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapsuleStatus {
    Draft,
    Frozen,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Capsule {
    pub id: String,
    pub name: String,
    pub status: CapsuleStatus,
    #[serde(default)]
    pub decision_ids: Vec<String>,
    #[serde(default)]
    pub memory_ids: Vec<String>,
}

/// Knowledge-graph summary for a project.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphStats {
    pub node_count: u64,
    pub edge_count: u64,
    #[serde(default)]
    pub nodes_by_type: HashMap<String, u64>,
}

// ============================================================================
// Chat (assistant)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A decision or memory attached to a chat request as grounding context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaggedItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggedItemKind {
    Decision,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<ChatMessage>,
    pub tagged_items: Vec<TaggedItem>,
    pub stream: bool,
    pub session_id: String,
    pub project_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_status_decodes_screaming_snake() {
        let d: Decision = serde_json::from_str(
            r#"{"id":"d1","statement":"use postgres","status":"ACCEPTED"}"#,
        )
        .unwrap();
        assert_eq!(d.status, DecisionStatus::Accepted);
        assert_eq!(d.status.as_str(), "ACCEPTED");
    }

    #[test]
    fn unknown_task_status_decodes_to_catch_all() {
        let t: Task = serde_json::from_str(
            r#"{"id":"t1","title":"ship it","status":"BLOCKED","priority":"HIGH"}"#,
        )
        .unwrap();
        assert_eq!(t.status, TaskStatus::Unknown);
        // Unknown statuses jump straight to DONE on toggle
        assert_eq!(t.status.toggled(), TaskStatus::Done);
    }

    #[test]
    fn task_toggle_cycle() {
        assert_eq!(TaskStatus::Todo.toggled(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Done);
        assert_eq!(TaskStatus::Done.toggled(), TaskStatus::Todo);
        assert_eq!(TaskStatus::Review.toggled(), TaskStatus::Done);
    }

    #[test]
    fn acceptable_statuses() {
        assert!(DecisionStatus::Draft.acceptable());
        assert!(DecisionStatus::Pending.acceptable());
        assert!(!DecisionStatus::Accepted.acceptable());
        assert!(!DecisionStatus::Deprecated.acceptable());
    }

    #[test]
    fn tagged_item_serializes_type_field() {
        let item = TaggedItem {
            id: "d1".into(),
            kind: TaggedItemKind::Decision,
            statement: Some("use postgres".into()),
            content: "benchmarks favored it".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "decision");
        assert_eq!(json["statement"], "use postgres");
    }
}

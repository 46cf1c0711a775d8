//! Chat assistant session state.
//!
//! Holds the conversation transcript, the input draft, and a snapshot of
//! project context (recent decisions and memories) that is attached to
//! every request so the assistant can ground its answers.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::types::{
    ChatMessage, ChatRequest, ChatRole, Decision, Memory, TaggedItem, TaggedItemKind,
};

/// At most this many decisions are attached as context.
const CONTEXT_DECISIONS: usize = 10;
/// At most this many memories are attached as context.
const CONTEXT_MEMORIES: usize = 15;

const STATEMENT_LIMIT: usize = 160;
const DETAIL_LIMIT: usize = 240;

pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub streaming: bool,
    session_id: String,
    context: Vec<TaggedItem>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            streaming: false,
            session_id: new_session_id(),
            context: Vec::new(),
        }
    }

    /// Snapshot project context for the lifetime of this session.
    pub fn set_context(&mut self, decisions: &[Decision], memories: &[Memory]) {
        self.context.clear();
        for d in decisions.iter().take(CONTEXT_DECISIONS) {
            self.context.push(TaggedItem {
                id: d.id.clone(),
                kind: TaggedItemKind::Decision,
                statement: Some(truncate(&d.statement, STATEMENT_LIMIT)),
                content: truncate(&d.rationale, DETAIL_LIMIT),
            });
        }
        for m in memories.iter().take(CONTEXT_MEMORIES) {
            self.context.push(TaggedItem {
                id: m.id.clone(),
                kind: TaggedItemKind::Memory,
                statement: None,
                content: truncate(&m.content, DETAIL_LIMIT),
            });
        }
    }

    /// Identifier replies must carry to be folded into this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn can_send(&self) -> bool {
        !self.streaming && !self.input.trim().is_empty()
    }

    /// Commit the draft as a user turn and build the request for it.
    ///
    /// The conversation history sent to the server excludes the message
    /// being asked, which travels in its own field.
    pub fn begin_send(&mut self, project_name: &str) -> ChatRequest {
        let message = self.input.trim().to_string();
        let history = self.messages.clone();
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: message.clone(),
        });
        self.input.clear();
        self.streaming = true;
        ChatRequest {
            message,
            conversation_history: history,
            tagged_items: self.context.clone(),
            stream: true,
            session_id: self.session_id.clone(),
            project_name: project_name.to_string(),
        }
    }

    /// Record the assistant's complete reply and unlock the input.
    pub fn finish_send(&mut self, reply: &str) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: sanitize_markdown(reply),
        });
        self.streaming = false;
    }

    /// A failed request still unlocks the input; the error surfaces in the
    /// status line, not the transcript.
    pub fn abort_send(&mut self) {
        self.streaming = false;
    }

    pub fn push_char(&mut self, c: char) {
        if !self.streaming {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if !self.streaming {
            self.input.pop();
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

fn new_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("cli-{nanos}")
}

fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let cut: String = s.chars().take(limit).collect();
    format!("{cut}...")
}

/// Strip the markdown emphasis markers models like to emit; they read as
/// noise in a plain terminal transcript.
pub fn sanitize_markdown(s: &str) -> String {
    s.replace("**", "").replace("__", "").replace('`', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(id: &str, statement: &str) -> Decision {
        Decision {
            id: id.into(),
            statement: statement.into(),
            rationale: "because".into(),
            status: crate::api::types::DecisionStatus::Accepted,
            created_at: String::new(),
            updated_at: String::new(),
            accepted_at: None,
            accepted_by: None,
            tags: Vec::new(),
        }
    }

    fn memory(id: &str, content: &str) -> Memory {
        Memory {
            id: id.into(),
            content: content.into(),
            tags: Vec::new(),
            decision_ids: Vec::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn context_is_capped() {
        let decisions: Vec<_> = (0..20).map(|i| decision(&i.to_string(), "d")).collect();
        let memories: Vec<_> = (0..30).map(|i| memory(&i.to_string(), "m")).collect();
        let mut session = ChatSession::new();
        session.set_context(&decisions, &memories);
        let decision_count = session
            .context
            .iter()
            .filter(|t| t.kind == TaggedItemKind::Decision)
            .count();
        assert_eq!(decision_count, 10);
        assert_eq!(session.context.len(), 25);
    }

    #[test]
    fn context_truncates_long_statements() {
        let long = "x".repeat(500);
        let mut session = ChatSession::new();
        session.set_context(&[decision("1", &long)], &[]);
        let statement = session.context[0].statement.clone().unwrap();
        assert_eq!(statement.chars().count(), 163);
        assert!(statement.ends_with("..."));
    }

    #[test]
    fn begin_send_excludes_current_message_from_history() {
        let mut session = ChatSession::new();
        session.input = "first".into();
        let req = session.begin_send("proj");
        assert!(req.conversation_history.is_empty());
        assert_eq!(req.message, "first");
        assert!(session.streaming);

        session.finish_send("answer");
        session.input = "second".into();
        let req = session.begin_send("proj");
        assert_eq!(req.conversation_history.len(), 2);
        assert_eq!(req.message, "second");
    }

    #[test]
    fn input_is_locked_while_streaming() {
        let mut session = ChatSession::new();
        session.input = "hello".into();
        session.begin_send("proj");
        session.push_char('x');
        session.backspace();
        assert!(session.input.is_empty());
        assert!(!session.can_send());
        session.finish_send("done");
        session.push_char('y');
        assert_eq!(session.input, "y");
    }

    #[test]
    fn session_id_is_cli_prefixed() {
        let session = ChatSession::new();
        assert!(session.session_id.starts_with("cli-"));
    }

    #[test]
    fn sanitize_strips_emphasis() {
        assert_eq!(sanitize_markdown("**bold** and `code`"), "bold and code");
    }
}

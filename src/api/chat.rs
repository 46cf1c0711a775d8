// Streaming chat endpoint.
//
// The assistant endpoint streams its answer as SSE-style lines:
//
// ```
// data: {"type":"text","text":"..."}
// data: [DONE]
// ```
//
// The exact event vocabulary belongs to the server; this client only cares
// about incremental text and the end-of-stream marker. Lines it cannot
// parse (progress markers, usage summaries, keep-alives) are skipped.
// Chunks can split anywhere, so bytes are buffered until a full line is
// available before parsing.

use super::{ApiClient, ApiError};
use crate::api::types::ChatRequest;
use bytes::BytesMut;
use futures::StreamExt;

impl ApiClient {
    /// Send a chat message and invoke `on_chunk` for each text fragment as
    /// it arrives. Returns once the stream ends ([DONE] or EOF).
    pub async fn send_chat_message(
        &self,
        project_id: &str,
        req: &ChatRequest,
        mut on_chunk: impl FnMut(&str),
    ) -> Result<(), ApiError> {
        let url = format!("{}/api/v1/projects/{}/chat", self.base_url(), project_id);

        let resp = self
            .authorize(self.stream_http().post(&url).json(req))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ApiError::Auth(body),
                404 => ApiError::NotFound(body),
                s => ApiError::Api { status: s, body },
            });
        }

        let mut stream = resp.bytes_stream();
        let mut buf = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);

            // Drain every complete line out of the buffer
            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line = buf.split_to(pos + 1);
                let line = String::from_utf8_lossy(&line);
                match parse_stream_line(line.trim()) {
                    StreamLine::Text(text) => on_chunk(&text),
                    StreamLine::Done => return Ok(()),
                    StreamLine::Skip => {}
                }
            }
        }

        // Stream ended without an explicit [DONE]; whatever text arrived
        // still counts as a complete answer.
        if let StreamLine::Text(text) = parse_stream_line(String::from_utf8_lossy(&buf).trim()) {
            on_chunk(&text);
        }
        Ok(())
    }
}

enum StreamLine {
    Text(String),
    Done,
    Skip,
}

/// Parse one SSE line. Only `data:` lines matter; the payload is either the
/// `[DONE]` terminator, a JSON object with incremental text, or something
/// this client skips.
fn parse_stream_line(line: &str) -> StreamLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return StreamLine::Skip;
    };
    let payload = payload.trim();

    if payload.is_empty() {
        return StreamLine::Skip;
    }
    if payload == "[DONE]" {
        return StreamLine::Done;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) else {
        // Plain-text data line: pass it through as-is
        return StreamLine::Text(payload.to_string());
    };

    // Accept both {"text": "..."} and {"delta": {"text": "..."}} shapes
    let text = value
        .get("text")
        .and_then(|t| t.as_str())
        .or_else(|| {
            value
                .get("delta")
                .and_then(|d| d.get("text"))
                .and_then(|t| t.as_str())
        });

    match text {
        Some(t) => StreamLine::Text(t.to_string()),
        None => StreamLine::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &str) -> Option<String> {
        match parse_stream_line(line) {
            StreamLine::Text(t) => Some(t),
            _ => None,
        }
    }

    #[test]
    fn parses_text_payload() {
        assert_eq!(
            text_of(r#"data: {"type":"text","text":"hello"}"#),
            Some("hello".to_string())
        );
    }

    #[test]
    fn parses_nested_delta_payload() {
        assert_eq!(
            text_of(r#"data: {"delta":{"text":" world"}}"#),
            Some(" world".to_string())
        );
    }

    #[test]
    fn done_marker_terminates() {
        assert!(matches!(parse_stream_line("data: [DONE]"), StreamLine::Done));
    }

    #[test]
    fn non_data_lines_are_skipped() {
        assert!(matches!(parse_stream_line("event: progress"), StreamLine::Skip));
        assert!(matches!(parse_stream_line(""), StreamLine::Skip));
        assert!(matches!(parse_stream_line("data:"), StreamLine::Skip));
    }

    #[test]
    fn unknown_json_payloads_are_skipped() {
        assert!(matches!(
            parse_stream_line(r#"data: {"type":"usage","tokens":42}"#),
            StreamLine::Skip
        ));
    }

    #[test]
    fn plain_text_data_passes_through() {
        assert_eq!(text_of("data: thinking..."), Some("thinking...".to_string()));
    }
}

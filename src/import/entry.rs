//! Log entry parsing
//!
//! One JSONL line is one log entry. The envelope (uuid, type, role,
//! timestamp, cwd, token usage, version) goes to the messages table; the
//! message content is split into ordered blocks.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The type field is required on every stored entry.
    #[error("log entry has no type field")]
    MissingType,
}

/// A parsed log entry: message envelope plus content blocks.
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    pub uuid: Option<String>,
    pub kind: String,
    pub role: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub cwd: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub version: Option<String>,
    /// Conversation summary carried by 'summary' entries.
    pub summary: Option<String>,
    pub blocks: Vec<ParsedBlock>,
}

/// One content block, in message order.
#[derive(Debug, Clone)]
pub struct ParsedBlock {
    pub block_type: String,
    pub text: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<Value>,
    pub tool_use_id: Option<String>,
}

impl ParsedBlock {
    pub fn text(block_type: &str, text: &str) -> Self {
        Self {
            block_type: block_type.to_string(),
            text: Some(text.to_string()),
            tool_name: None,
            tool_input: None,
            tool_use_id: None,
        }
    }
}

// Bookkeeping lines, not conversation content
const SKIPPED_KINDS: &[&str] = &["queue-operation", "file-history-snapshot"];

/// Parse one JSONL line.
///
/// Returns `Ok(None)` for blank lines and bookkeeping entries the store
/// does not keep. A line without a `type` is malformed input, not a
/// skippable one.
pub fn parse_line(line: &str) -> Result<Option<ParsedEntry>, EntryError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let json: Value = serde_json::from_str(line)?;

    let kind = match json.get("type").and_then(|v| v.as_str()) {
        Some(k) => k.to_string(),
        None => return Err(EntryError::MissingType),
    };
    if SKIPPED_KINDS.contains(&kind.as_str()) {
        return Ok(None);
    }

    let timestamp = json
        .get("timestamp")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let message = json.get("message");
    let role = message
        .and_then(|m| m.get("role"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let usage = message.and_then(|m| m.get("usage"));
    let input_tokens = usage
        .and_then(|u| u.get("input_tokens"))
        .and_then(|v| v.as_i64());
    let output_tokens = usage
        .and_then(|u| u.get("output_tokens"))
        .and_then(|v| v.as_i64());

    let summary = if kind == "summary" {
        json.get("summary").and_then(|v| v.as_str()).map(String::from)
    } else {
        None
    };

    // A summary entry's content is its summary text; everything else
    // carries content under message.content
    let blocks = match &summary {
        Some(text) => vec![ParsedBlock::text("text", text)],
        None => parse_content(message.and_then(|m| m.get("content"))),
    };

    Ok(Some(ParsedEntry {
        uuid: json.get("uuid").and_then(|v| v.as_str()).map(String::from),
        kind,
        role,
        timestamp,
        cwd: json.get("cwd").and_then(|v| v.as_str()).map(String::from),
        input_tokens,
        output_tokens,
        version: json
            .get("version")
            .and_then(|v| v.as_str())
            .map(String::from),
        summary,
        blocks,
    }))
}

fn parse_content(content: Option<&Value>) -> Vec<ParsedBlock> {
    let content = match content {
        Some(c) => c,
        None => return vec![],
    };

    // Legacy entries carry a bare string instead of a block array
    if let Some(text) = content.as_str() {
        return vec![ParsedBlock::text("text", text)];
    }

    content
        .as_array()
        .map(|items| items.iter().filter_map(parse_block).collect())
        .unwrap_or_default()
}

fn parse_block(item: &Value) -> Option<ParsedBlock> {
    let block_type = item.get("type").and_then(|v| v.as_str())?;

    let block = match block_type {
        "text" => ParsedBlock {
            block_type: "text".to_string(),
            text: item.get("text").and_then(|v| v.as_str()).map(String::from),
            tool_name: None,
            tool_input: None,
            tool_use_id: None,
        },
        "thinking" => ParsedBlock {
            block_type: "thinking".to_string(),
            text: item
                .get("thinking")
                .and_then(|v| v.as_str())
                .map(String::from),
            tool_name: None,
            tool_input: None,
            tool_use_id: None,
        },
        "tool_use" => ParsedBlock {
            block_type: "tool_use".to_string(),
            text: None,
            tool_name: item.get("name").and_then(|v| v.as_str()).map(String::from),
            tool_input: item.get("input").cloned(),
            tool_use_id: item.get("id").and_then(|v| v.as_str()).map(String::from),
        },
        "tool_result" => ParsedBlock {
            block_type: "tool_result".to_string(),
            text: tool_result_text(item.get("content")),
            tool_name: None,
            tool_input: None,
            tool_use_id: item
                .get("tool_use_id")
                .and_then(|v| v.as_str())
                .map(String::from),
        },
        other => ParsedBlock {
            block_type: other.to_string(),
            text: item.get("text").and_then(|v| v.as_str()).map(String::from),
            tool_name: None,
            tool_input: None,
            tool_use_id: None,
        },
    };

    Some(block)
}

/// Tool result content is either a plain string or an array of parts.
fn tool_result_text(content: Option<&Value>) -> Option<String> {
    let content = content?;

    if let Some(text) = content.as_str() {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = content
        .as_array()?
        .iter()
        .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

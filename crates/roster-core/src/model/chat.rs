use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum chat message length accepted by the backend.
pub const MAX_MESSAGE_CHARS: usize = 1_000;

/// One entry in an incident's chat thread. Immutable once the server has
/// stamped it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "useremail")]
    pub author_email: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Trim a message and check it against the backend's length rules.
///
/// Returns the trimmed content, or `None` when nothing remains.
///
/// # Errors
///
/// Returns the character count when the message exceeds
/// [`MAX_MESSAGE_CHARS`].
pub fn normalize_message(content: &str) -> Result<Option<&str>, usize> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let len = trimmed.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(len);
    }
    Ok(Some(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_uses_backend_field_name() {
        let raw = r#"{"useremail":"a@example.com","content":"on it","timestamp":"2024-01-01T00:00:00Z"}"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.author_email, "a@example.com");
        let back = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["useremail"], "a@example.com");
    }

    #[test]
    fn normalize_trims_and_rejects_blank() {
        assert_eq!(normalize_message("  hi \n").unwrap(), Some("hi"));
        assert_eq!(normalize_message(" \t\n").unwrap(), None);
        assert_eq!(normalize_message("").unwrap(), None);
    }

    #[test]
    fn normalize_rejects_oversized() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(normalize_message(&long), Err(MAX_MESSAGE_CHARS + 1));
        let exact = "y".repeat(MAX_MESSAGE_CHARS);
        assert!(normalize_message(&exact).unwrap().is_some());
    }
}

use std::fmt;

use crate::model::MAX_MESSAGE_CHARS;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    Unauthenticated,
    IncidentNotFound,
    ValidationFailed,
    EmptyMessage,
    MessageTooLong,
    NetworkFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::Unauthenticated => "E1101",
            Self::IncidentNotFound => "E2001",
            Self::ValidationFailed => "E2005",
            Self::EmptyMessage => "E2101",
            Self::MessageTooLong => "E2102",
            Self::NetworkFailure => "E5101",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::Unauthenticated => "Session expired or missing",
            Self::IncidentNotFound => "Incident not found",
            Self::ValidationFailed => "Incident fields rejected",
            Self::EmptyMessage => "Chat message is empty",
            Self::MessageTooLong => "Chat message is too long",
            Self::NetworkFailure => "Incident service unreachable",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in roster/config.toml and retry."),
            Self::Unauthenticated => {
                Some("Log in again and update `server.token` or `ROSTER_TOKEN`.")
            }
            Self::IncidentNotFound => Some("Run `roster list` to refresh incident IDs."),
            Self::ValidationFailed => {
                Some("Title must be 1-200 non-blank characters; status and priority must be valid.")
            }
            Self::EmptyMessage => Some("Type something before sending."),
            Self::MessageTooLong => Some("Split the message into several shorter ones."),
            Self::NetworkFailure => Some("Check `server.base_url` and retry."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures reported by an [`IncidentRepository`](crate::repo::IncidentRepository).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    /// Transport failure or unexpected server response.
    #[error("network error: {0}")]
    Network(String),

    /// The session is missing or expired (HTTP 401).
    #[error("unauthenticated: {0}")]
    Auth(String),

    /// The repository rejected the submitted fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced incident does not exist (or was deleted).
    #[error("not found: {0}")]
    NotFound(String),

    /// The repository failed on its own side, e.g. could not persist a write.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepoError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Network(_) => ErrorCode::NetworkFailure,
            Self::Auth(_) => ErrorCode::Unauthenticated,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::IncidentNotFound,
            Self::Internal(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Errors surfaced by the roster engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Chat content was empty after trimming; nothing was sent.
    #[error("chat message must not be empty")]
    EmptyMessage,

    #[error("chat message must be <= {max} characters (got {len})")]
    MessageTooLong { len: usize, max: usize },
}

impl RosterError {
    pub(crate) const fn too_long(len: usize) -> Self {
        Self::MessageTooLong {
            len,
            max: MAX_MESSAGE_CHARS,
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Repo(err) => err.code(),
            Self::EmptyMessage => ErrorCode::EmptyMessage,
            Self::MessageTooLong { .. } => ErrorCode::MessageTooLong,
        }
    }

    /// True when the caller should send the user back to log in.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Repo(RepoError::Auth(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, RepoError, RosterError};
    use std::collections::HashSet;

    const ALL: [ErrorCode; 8] = [
        ErrorCode::ConfigParseError,
        ErrorCode::Unauthenticated,
        ErrorCode::IncidentNotFound,
        ErrorCode::ValidationFailed,
        ErrorCode::EmptyMessage,
        ErrorCode::MessageTooLong,
        ErrorCode::NetworkFailure,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn only_auth_requests_reauthentication() {
        assert!(RosterError::from(RepoError::Auth("expired".into())).is_auth());
        assert!(!RosterError::from(RepoError::NotFound("x".into())).is_auth());
        assert!(!RosterError::from(RepoError::Network("down".into())).is_auth());
        assert!(!RosterError::EmptyMessage.is_auth());
    }

    #[test]
    fn internal_failures_get_their_own_code() {
        let err = RosterError::from(RepoError::Internal("disk full".into()));
        assert_eq!(err.code(), ErrorCode::InternalUnexpected);
        assert_eq!(err.code().code(), "E9001");
        assert!(!err.is_auth());
    }

    #[test]
    fn repo_message_is_surfaced_verbatim() {
        let err = RosterError::from(RepoError::Validation("Title cannot be empty".into()));
        assert_eq!(err.to_string(), "validation error: Title cannot be empty");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}

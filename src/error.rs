// Data layer error types
use serde::Deserialize;

/// Backend error codes that mean row-level security said no.
const PERMISSION_CODES: &[&str] = &["42501", "PGRST301", "PGRST302"];

/// Error body shape returned by the hosted data API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Errors produced by the data-access layer.
///
/// Permission denials are classified once, at the remote-call boundary
/// ([`DataError::from_response`]), never re-inferred downstream from strings.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Missing endpoint/key. Fatal at first use, never retried.
    #[error("{0}")]
    Configuration(&'static str),

    /// Row-level security rejected the request. Never retried.
    #[error("permission denied by the backend ({code}): {message}")]
    PermissionDenied { code: String, message: String },

    /// The backend answered with a non-permission error status.
    #[error("backend request failed ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered 2xx but the payload did not match the
    /// expected shape.
    #[error("failed to decode backend response: {0}")]
    Decode(String),

    /// Client-side input rejected before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A mutation was attempted without a selected account. Synchronous,
    /// never reaches the backend.
    #[error("{0}")]
    Precondition(&'static str),
}

impl DataError {
    /// Classify a non-success backend response into the typed taxonomy.
    pub fn from_response(status: u16, body: ApiErrorBody) -> Self {
        let message = body
            .message
            .clone()
            .or(body.details)
            .or(body.hint)
            .unwrap_or_else(|| format!("request failed with status {}", status));

        if is_permission_signature(body.code.as_deref(), &message) {
            return DataError::PermissionDenied {
                code: body.code.unwrap_or_else(|| "42501".to_string()),
                message,
            };
        }

        DataError::Api {
            status,
            code: body.code,
            message,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, DataError::PermissionDenied { .. })
    }

    /// Transient faults are worth another attempt; everything else is
    /// deterministic and fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Api { .. } | DataError::Http(_))
    }

    /// Message for end users: permission problems get the view-only
    /// wording, everything else surfaces as-is.
    pub fn user_message(&self) -> String {
        if self.is_permission_denied() {
            "You have view-only access for this account. Ask an account owner to change your role."
                .to_string()
        } else {
            self.to_string()
        }
    }
}

fn is_permission_signature(code: Option<&str>, message: &str) -> bool {
    if let Some(code) = code {
        if !code.is_empty() {
            return PERMISSION_CODES.contains(&code);
        }
    }
    message.to_ascii_lowercase().contains("permission denied")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(code: Option<&str>, message: &str) -> ApiErrorBody {
        ApiErrorBody {
            code: code.map(str::to_string),
            message: Some(message.to_string()),
            details: None,
            hint: None,
        }
    }

    #[test]
    fn rls_codes_classify_as_permission_denied() {
        for code in ["42501", "PGRST301", "PGRST302"] {
            let err = DataError::from_response(403, body(Some(code), "nope"));
            assert!(err.is_permission_denied(), "code {} should classify", code);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn message_pattern_classifies_when_code_missing() {
        let err = DataError::from_response(401, body(None, "Permission DENIED for table guards"));
        assert!(err.is_permission_denied());
    }

    #[test]
    fn known_code_wins_over_message() {
        // A concrete non-RLS code must not be reclassified off the message.
        let err = DataError::from_response(409, body(Some("23505"), "permission denied-ish text"));
        assert!(!err.is_permission_denied());
        assert!(err.is_retryable());
    }

    #[test]
    fn plain_server_error_is_retryable() {
        let err = DataError::from_response(500, body(None, "server exploded"));
        assert!(!err.is_permission_denied());
        assert!(err.is_retryable());
    }

    #[test]
    fn permission_user_message_is_distinct() {
        let denied = DataError::from_response(403, body(Some("42501"), "permission denied"));
        let generic = DataError::from_response(500, body(None, "boom"));
        assert!(denied.user_message().contains("view-only"));
        assert!(!generic.user_message().contains("view-only"));
    }
}

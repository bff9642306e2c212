use serde_json::{json, Value};

/// Failure reported by the storage collaborator.
#[derive(Debug)]
pub enum StoreError {
    /// Could not obtain a connection.
    Unavailable(String),
    /// The statement itself failed.
    Query(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            StoreError::Query(msg) => write!(f, "query failed: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        tracing::error!(?err, "database error");
        StoreError::Query(err.to_string())
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for StoreError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        tracing::error!(?err, "pool error");
        StoreError::Unavailable(err.to_string())
    }
}

/// Action-handler error that renders into the outbound `error` event.
///
/// `message` is the specific human-readable text, `kind` the class phrase,
/// `code` the machine-readable taxonomy entry.
#[derive(Debug)]
pub struct GatewayError {
    pub code: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl GatewayError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            code: "AUTHENTICATION_REQUIRED",
            kind: "Authentication required",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "AUTHORIZATION_DENIED",
            kind: "Authorization denied",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND",
            kind: "Not found",
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT",
            kind: "Conflict",
            message: message.into(),
        }
    }

    pub fn rate_limited() -> Self {
        Self {
            code: "RATE_LIMITED",
            kind: "Rate limited",
            message: "Rate limit exceeded".to_string(),
        }
    }

    pub fn internal() -> Self {
        Self {
            code: "INTERNAL_ERROR",
            kind: "Internal error",
            message: "An internal error occurred".to_string(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            code: "UNKNOWN_ERROR",
            kind: "Unknown error",
            message: message.into(),
        }
    }

    /// Wire payload for the `error` event.
    pub fn payload(&self) -> Value {
        json!({
            "message": self.message,
            "error": self.kind,
            "code": self.code,
            "timestamp": chrono::Utc::now(),
        })
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<StoreError> for GatewayError {
    fn from(_: StoreError) -> Self {
        GatewayError::internal()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Failure kinds shared by handlers, clients and the worker.
#[derive(Debug, Clone)]
pub enum AppError {
    /// A required setting (queue URL, store credentials, shared secret) is missing.
    Configuration(String),
    /// Missing or mismatched shared secret.
    Unauthorized(String),
    /// The data store answered with a non-success status.
    Upstream { status: StatusCode, message: String },
    /// Transport or decoding failure talking to the LLM, SQS or Supabase.
    External(String),
    Internal(String),
    /// An error annotated with what was being attempted.
    Context { source: Box<AppError>, context: String },
}

impl AppError {
    /// Innermost error, skipping context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stable short name used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            AppError::Configuration(_) => "configuration",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Upstream { .. } => "upstream",
            AppError::External(_) => "external",
            AppError::Internal(_) => "internal",
            AppError::Context { .. } => "context",
        }
    }

    fn status(&self) -> StatusCode {
        match self.root() {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream { status, .. } => *status,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `error` field of the response body.
    fn public_message(&self) -> String {
        match self.root() {
            AppError::Configuration(msg)
            | AppError::Unauthorized(msg)
            | AppError::Internal(msg)
            | AppError::Upstream { message: msg, .. } => msg.clone(),
            AppError::External(_) | AppError::Context { .. } => "External service error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Upstream { status, message } => {
                write!(f, "Upstream returned {}: {}", status, message)
            }
            AppError::External(msg) => write!(f, "External service error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Context { source, context } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error_kind = self.kind(), "{}", self);
        } else {
            tracing::warn!(error_kind = self.kind(), "{}", self);
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::External(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// `anyhow::Context`-style annotation for `Result<T, AppError>`.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Builds the context message only on the error path.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.with_context(|| context.into())
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| AppError::Context {
            context: f(),
            source: Box::new(source),
        })
    }
}

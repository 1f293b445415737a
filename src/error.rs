use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters of an upstream body kept for diagnostics.
pub const BODY_SNIPPET_LEN: usize = 200;

/// Everything that can end a planning pass early.
///
/// Every variant is terminal for the current request only; the service keeps
/// answering the next one.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("No irradiance data available: {0}")]
    DataUnavailable(String),

    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    Transport {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid system configuration: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with HTTP {code}"),
        None => String::new(),
    }
}

impl PlannerError {
    /// Builds a transport error from a non-2xx upstream response body.
    pub fn upstream_status(service: &'static str, status: u16, body: &str) -> Self {
        PlannerError::Transport {
            service,
            status: Some(status),
            message: snippet(body),
        }
    }

    pub fn network(service: &'static str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        PlannerError::Transport {
            service,
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlannerError::AddressNotFound(_) => StatusCode::NOT_FOUND,
            PlannerError::DataUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlannerError::Transport { .. } => StatusCode::BAD_GATEWAY,
            PlannerError::InvalidGeometry(_)
            | PlannerError::Configuration(_)
            | PlannerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PlannerError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            PlannerError::AddressNotFound(_) => "AddressNotFound",
            PlannerError::DataUnavailable(_) => "DataUnavailable",
            PlannerError::Transport { .. } => "TransportError",
            PlannerError::InvalidGeometry(_) => "InvalidGeometry",
            PlannerError::Configuration(_) => "ConfigurationError",
            PlannerError::InvalidRequest(_) => "InvalidRequest",
            PlannerError::Export(_) => "InternalError",
        }
    }
}

/// Text of a failed upstream response. A body that cannot be read is
/// reported in its place.
pub fn body_or_read_error(body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read upstream error body");
        format!("<unreadable body: {e}>")
    })
}

/// Truncates an upstream body on a char boundary.
pub fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            PlannerError::Transport { .. } => {
                tracing::warn!(error = %self, "upstream service failed");
            }
            PlannerError::Export(_) => tracing::error!(error = %self, "export failed"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let body = ErrorResponse {
            error: self.error_type(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

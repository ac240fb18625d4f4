use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Prefix of every user-visible load/processing failure.
pub const PROCESSING_FAILED: &str = "Failed to process data";
/// Prefix of every user-visible summarizer failure.
pub const SUMMARY_FAILED: &str = "AI summary failed";

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    Summarization(String),
    #[error("summarizer is not configured")]
    SummarizerDisabled,
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl DashboardError {
    /// The single message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Summarization(msg) => format!("{SUMMARY_FAILED}: {msg}"),
            Self::SummarizerDisabled => format!("{SUMMARY_FAILED}: {self}"),
            other => format!("{PROCESSING_FAILED}: {other}"),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Fetch(_) | Self::Parse(_) | Self::Summarization(_) => StatusCode::BAD_GATEWAY,
            Self::SummarizerDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        let body = serde_json::json!({ "error": self.user_message() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failures_share_one_prefix() {
        let fetch = DashboardError::Fetch("HTTP 404".into()).user_message();
        let parse = DashboardError::Parse("sheet missing".into()).user_message();
        assert!(fetch.starts_with("Failed to process data: "));
        assert!(parse.starts_with("Failed to process data: "));
    }

    #[test]
    fn summarizer_failure_is_verbatim_after_marker() {
        let msg = DashboardError::Summarization("quota exceeded".into()).user_message();
        assert_eq!(msg, "AI summary failed: quota exceeded");
    }

    #[test]
    fn status_codes() {
        assert_eq!(DashboardError::Fetch(String::new()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(DashboardError::InvalidQuery(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(DashboardError::SummarizerDisabled.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

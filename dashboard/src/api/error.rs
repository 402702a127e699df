use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authorization required.")]
    AuthRequired,

    #[error("invalid backend base URL `{0}`")]
    InvalidBaseUrl(String),

    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend answered {status}{}", detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("superseded by a newer request")]
    Superseded,
}

impl ApiError {
    /// Message shown inline to the user. Backend-provided details are
    /// preferred; everything else collapses to `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            ApiError::AuthRequired => "Authorization required.",
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail,
            _ => fallback,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

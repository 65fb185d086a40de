//! Error types for the portal

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Cloud not configured")]
  CloudNotConfigured,

  #[error("Backend request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Backend returned HTTP {status}: {body}")]
  Backend { status: u16, body: String },

  #[error("Malformed payload: {0}")]
  Json(#[from] json::Error),

  #[error("{0}")]
  Validation(String),

  #[error("{0} not found")]
  NotFound(&'static str),

  #[error("Not authenticated")]
  Unauthenticated,

  #[error("Admin role required")]
  Forbidden,

  #[error("Identity exchange failed: {0}")]
  Identity(String),

  #[error("Webhook not configured")]
  WebhookNotConfigured,

  #[error("Invalid sync token: {0}")]
  SyncToken(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Validation(_) | Error::SyncToken(_) => StatusCode::BAD_REQUEST,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Unauthenticated | Error::Identity(_) => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::CloudNotConfigured | Error::WebhookNotConfigured => {
        StatusCode::SERVICE_UNAVAILABLE
      }
      Error::Request(_) | Error::Backend { .. } => StatusCode::BAD_GATEWAY,
      Error::Database(_) | Error::Json(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    if status.is_server_error() {
      tracing::error!("Request failed: {self}");
    }

    let body = json::json!({
      "success": false,
      "error": self.to_string(),
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

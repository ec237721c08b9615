use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Unique fields guarded by the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    CardTitle,
    BizNumber,
}

/// Errors produced by the user and card stores.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("duplicate value for {0:?}")]
    Duplicate(UniqueField),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// Maps a Postgres unique violation to [`RepoError::Duplicate`] using the constraint name.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let field = match db.constraint() {
                    Some("users_email_key") => Some(UniqueField::Email),
                    Some("cards_owner_title_key") => Some(UniqueField::CardTitle),
                    Some("cards_biz_number_key") => Some(UniqueField::BizNumber),
                    _ => None,
                };
                if let Some(field) = field {
                    return RepoError::Duplicate(field);
                }
            }
        }
        RepoError::Database(err)
    }
}

/// Error returned by every handler. Rendered as
/// `{"code": "...", "message": "...", "errors": [...]}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("Email or password are incorrect")]
    BadCredentials,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Account is blocked for {hours_left}H, try again later")]
    Blocked { hours_left: i64 },
    #[error("{0}")]
    NotFound(String),
    #[error("Something went wrong, try again")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::BadCredentials => "INVALID_CREDENTIALS",
            ApiError::Conflict(_) => "ALREADY_EXISTS",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "PERMISSION_DENIED",
            ApiError::Blocked { .. } => "ACCOUNT_BLOCKED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::BadRequest(_)
            | ApiError::BadCredentials
            | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::Blocked { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(UniqueField::Email) => {
                ApiError::Conflict("User already exists".into())
            }
            RepoError::Duplicate(UniqueField::CardTitle) => {
                ApiError::Conflict("Card title already in use for this user".into())
            }
            RepoError::Duplicate(UniqueField::BizNumber) => {
                ApiError::Conflict("Card business number is already in use".into())
            }
            RepoError::Database(e) => ApiError::internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Internal(e) = &self {
            error!(error = %e, "request failed");
        }
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "code": self.code(),
                "message": self.to_string(),
                "errors": errors,
            }),
            _ => json!({
                "code": self.code(),
                "message": self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

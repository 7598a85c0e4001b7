use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::token::TokenError;

const EXPIRED_CHALLENGE: &str =
    r#"Bearer error="invalid_token", error_description="token expired""#;

#[derive(Debug)]
pub enum AppError {
    Sqlx(sqlx::Error),
    PasswordHash(argon2::password_hash::Error),
    Token(TokenError),
    LoginFail,
    MissingToken,
    InvalidParams(String),
    TagExists,
    TagNotFound,
}

impl From<sqlx::Error> for AppError {
    fn from(inner: sqlx::Error) -> Self {
        AppError::Sqlx(inner)
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(inner)
    }
}

impl From<TokenError> for AppError {
    fn from(inner: TokenError) -> Self {
        AppError::Token(inner)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Sqlx(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({"error": "Already exists"})),
                        )
                            .into_response();
                    }
                }
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::PasswordHash(e) => {
                tracing::error!("Password hash error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password hashing error".to_string(),
                )
            }
            AppError::Token(TokenError::Malformed(e)) => {
                tracing::debug!("Rejected malformed token: {}", e);
                (StatusCode::BAD_REQUEST, "Malformed token".to_string())
            }
            AppError::Token(TokenError::SignatureInvalid) => (
                StatusCode::UNAUTHORIZED,
                "Token signature is invalid".to_string(),
            ),
            AppError::Token(TokenError::Expired { .. }) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, EXPIRED_CHALLENGE)],
                    Json(json!({"error": "Token expired"})),
                )
                    .into_response();
            }
            AppError::Token(e @ (TokenError::EmptySecret | TokenError::Signing(_))) => {
                tracing::error!("JWT error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Token error".to_string())
            }
            AppError::LoginFail => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AppError::MissingToken => (
                StatusCode::BAD_REQUEST,
                "Missing bearer token".to_string(),
            ),
            AppError::InvalidParams(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TagExists => (
                StatusCode::CONFLICT,
                "Tag name already exists".to_string(),
            ),
            AppError::TagNotFound => (StatusCode::NOT_FOUND, "Tag not found".to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

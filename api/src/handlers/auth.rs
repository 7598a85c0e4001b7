use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{extract::State, Json};

use crate::{
    error::AppError,
    models::auth::{AuthResponse, LoginPayload},
    AppState,
};

const MAX_CREDENTIAL_LEN: usize = 50;

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    for (field, value) in [("username", &payload.username), ("password", &payload.password)] {
        if value.is_empty() || value.chars().count() > MAX_CREDENTIAL_LEN {
            return Err(AppError::InvalidParams(format!(
                "{field} must be 1 to {MAX_CREDENTIAL_LEN} characters"
            )));
        }
    }

    let auth = state
        .auth
        .find_by_username(&payload.username)
        .await?
        .ok_or(AppError::LoginFail)?;

    let parsed_hash = PasswordHash::new(&auth.password_hash)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::LoginFail)?;

    let token = state.tokens.issue(&payload.username, &payload.password)?;
    tracing::info!(username = %payload.username, "issued token");

    Ok(Json(AuthResponse { token }))
}

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, AppState};

/// Rejects requests without a valid `Authorization: Bearer` token.
pub async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AppError::MissingToken)?;
    let claims = state.tokens.verify(token).inspect_err(|e| {
        tracing::info!("Rejected token on {}: {}", req.uri().path(), e);
    })?;
    tracing::debug!(username = %claims.username, "token accepted");

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

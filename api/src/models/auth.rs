use serde::{Deserialize, Serialize};

#[derive(Debug, sqlx::FromRow)]
pub struct Auth {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

//! Issuing and verifying the signed identity tokens handed out by `/auth`.
//!
//! Tokens are compact HS256 JWS strings. The signing secret is injected when
//! the [`TokenService`] is built and never changes for the life of the value.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ISSUER: &str = "blog-api";

/// Lifetime of an issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 3 * 60 * 60;

/// Payload carried inside a token.
///
/// NOTE: the raw password travels in the payload, which anyone holding the
/// token can read. Existing clients rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub password: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "iss")]
    pub issuer: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        // Expiry is checked against a caller-supplied clock in `verify_at`,
        // with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, username: &str, password: &str) -> Result<String, TokenError> {
        self.issue_at(username, password, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, username: &str, password: &str, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            username: username.to_owned(),
            password: password.to_owned(),
            issued_at: now,
            expires_at: now + TOKEN_TTL_SECS,
            issuer: ISSUER.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Checks the signature, then requires `now < exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::SignatureInvalid
                }
                _ => TokenError::Malformed(e),
            },
        )?;

        if now >= data.claims.expires_at {
            return Err(TokenError::Expired {
                expired_at: data.claims.expires_at,
            });
        }

        Ok(data.claims)
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lp_common::Secret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TOKEN_TTL_HOURS: i64 = 24;
const BCRYPT_COST: u32 = 10;

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Could not hash the password: {0}")]
    Hashing(String),
    #[error("Could not sign the token: {0}")]
    Signing(String),
    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
    pub exp: i64,
    pub iat: i64,
}

/// Issues and validates the bearer tokens the loyalty service hands out on registration and login.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &Secret<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.reveal().as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.reveal().as_bytes()),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validates the token signature and expiry and returns the stable user id it carries.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims.user_id)
            .map_err(|_| AuthError::InvalidToken)
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

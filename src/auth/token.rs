//! Access token service
//!
//! Issues and verifies HS256 JWTs carrying `{id, role, iat, exp}`. There is
//! no server-side session state: a token is valid until `exp`, and nothing
//! can revoke it sooner. Lifetimes are kept short for that reason.
//!
//! Signature checking is delegated to `jsonwebtoken`; expiry is checked here
//! against an injected [`Clock`] so tests can pin time.

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::models::Role;

/// Source of "now" for token timestamps
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch seconds
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Signed identity claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user) id
    pub id: i32,
    pub role: Role,
    /// Issued at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
}

/// Why a token was rejected or could not be produced
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            _ => AppError::InvalidToken,
        }
    }
}

/// Stateless token issuer/verifier
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a service signing with `secret`, issuing tokens valid for
    /// `lifetime_secs`
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configured token lifetime
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue a token for `subject_id` at the current clock time
    pub fn issue(&self, subject_id: i32, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject_id, role, self.clock.now_epoch_secs())
    }

    /// Issue a token as if the time were `now`
    pub fn issue_at(&self, subject_id: i32, role: Role, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            id: subject_id,
            role,
            iat: now,
            exp: now + self.lifetime_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token at the current clock time
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, self.clock.now_epoch_secs())
    }

    /// Verify a token as if the time were `now`
    ///
    /// Fails on a bad signature, on any structural problem (including an
    /// unknown role), and once `now` reaches `exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

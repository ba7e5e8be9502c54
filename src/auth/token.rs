use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::MAX_TOKEN_EXPIRY_HOURS;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Identity ID
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

impl Claims {
    pub fn for_subject(subject: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Why a token was rejected. Only used for logging; callers see a single
/// normalized failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    BadSignature,
    Malformed,
}

/// HS256 signing service keyed by a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenSigner {
    /// `expiry_hours` is clamped to `1..=MAX_TOKEN_EXPIRY_HOURS`; `Settings`
    /// rejects anything outside that range before it gets here.
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::hours(expiry_hours.clamp(1, MAX_TOKEN_EXPIRY_HOURS)),
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::TokenError(e.to_string()))
    }

    /// Checks signature and expiry. Pure CPU work, no I/O.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            })
    }

    /// Signs a fresh token for `subject` using the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        self.sign(&Claims::for_subject(subject, self.lifetime))
    }
}

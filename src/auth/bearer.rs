use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::outcome::Outcome;
use crate::auth::projector::UserProjector;
use crate::auth::strategy::{AuthRequest, AuthStrategy};
use crate::auth::token::TokenSigner;
use crate::db::IdentityStore;
use crate::error::AuthError;

pub const BEARER_STRATEGY: &str = "bearer-token";

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let mut parts = header?.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

/// Resolves bearer tokens to live identities.
pub struct TokenValidator {
    store: Arc<dyn IdentityStore>,
    signer: TokenSigner,
    projector: UserProjector,
}

impl TokenValidator {
    pub fn new(store: Arc<dyn IdentityStore>, signer: TokenSigner) -> Self {
        Self {
            store,
            signer,
            projector: UserProjector,
        }
    }

    /// Validates the raw `Authorization` header value.
    pub async fn validate(&self, authorization: Option<&str>) -> Outcome {
        match extract_bearer(authorization) {
            Some(token) => self.validate_token(token).await,
            None => {
                debug!("Request carried no bearer token");
                Outcome::Failure(AuthError::MissingToken)
            }
        }
    }

    pub async fn validate_token(&self, token: &str) -> Outcome {
        // Signature and expiry are checked before any store round-trip.
        let claims = match self.signer.verify(token) {
            Ok(claims) => claims,
            Err(rejection) => {
                info!(?rejection, "Bearer token rejected");
                return Outcome::Failure(AuthError::InvalidToken);
            }
        };

        match self.store.find_by_id(&claims.sub).await {
            Ok(Some(identity)) => Outcome::Success(self.projector.project(&identity)),
            Ok(None) => {
                info!(subject = %claims.sub, "Token subject no longer exists");
                Outcome::Failure(AuthError::IdentityRevoked)
            }
            Err(e) => {
                warn!(subject = %claims.sub, error = %e, "Identity lookup failed");
                Outcome::fault(e)
            }
        }
    }
}

#[async_trait]
impl AuthStrategy for TokenValidator {
    fn name(&self) -> &'static str {
        BEARER_STRATEGY
    }

    async fn authenticate_request(&self, request: &AuthRequest<'_>) -> Outcome {
        self.validate(request.authorization).await
    }
}

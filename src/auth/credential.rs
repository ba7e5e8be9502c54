use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::hasher::HashPool;
use crate::auth::outcome::Outcome;
use crate::auth::projector::UserProjector;
use crate::auth::strategy::{AuthRequest, AuthStrategy};
use crate::db::IdentityStore;
use crate::error::AuthError;

pub const PASSWORD_STRATEGY: &str = "password";

/// Email and password as submitted to the login endpoint.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LoginCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for LoginCredentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl<'a> LoginCredentials<'a> {
    /// Reads non-empty `email` and `password` strings from a JSON body.
    pub fn from_request(request: &AuthRequest<'a>) -> Option<Self> {
        let body = request.body?;
        let field = |name: &str| body.get(name).and_then(|v| v.as_str()).filter(|s| !s.is_empty());

        Some(Self {
            email: field("email")?,
            password: field("password")?,
        })
    }
}

/// Email/password verification against the identity store.
pub struct CredentialVerifier {
    store: Arc<dyn IdentityStore>,
    hasher: HashPool,
    projector: UserProjector,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn IdentityStore>, hasher: HashPool) -> Self {
        Self {
            store,
            hasher,
            projector: UserProjector,
        }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Outcome {
        let identity = match self.store.find_by_email(email).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                info!(email, "Login rejected: unknown email");
                return Outcome::Failure(AuthError::UserNotFound);
            }
            Err(e) => {
                warn!(email, error = %e, "Identity lookup failed");
                return Outcome::fault(e);
            }
        };

        match identity.check_password(&self.hasher, password).await {
            Ok(true) => {
                debug!(email, id = %identity.id, "Password verified");
                Outcome::Success(self.projector.project(&identity))
            }
            Ok(false) => {
                info!(email, "Login rejected: password mismatch");
                Outcome::Failure(AuthError::InvalidCredential)
            }
            Err(e) => {
                warn!(email, error = %e, "Password comparison failed");
                Outcome::Error(e)
            }
        }
    }
}

#[async_trait]
impl AuthStrategy for CredentialVerifier {
    fn name(&self) -> &'static str {
        PASSWORD_STRATEGY
    }

    async fn authenticate_request(&self, request: &AuthRequest<'_>) -> Outcome {
        match LoginCredentials::from_request(request) {
            Some(credentials) => {
                self.authenticate(credentials.email, credentials.password).await
            }
            None => Outcome::Failure(AuthError::MissingCredentials),
        }
    }
}

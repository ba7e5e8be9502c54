use std::sync::Arc;
use tracing::info;

use crate::auth::bearer::{TokenValidator, BEARER_STRATEGY};
use crate::auth::credential::{CredentialVerifier, PASSWORD_STRATEGY};
use crate::auth::hasher::HashPool;
use crate::auth::strategy::AuthStrategy;
use crate::auth::token::TokenSigner;
use crate::config::AuthConfig;
use crate::db::IdentityStore;

/// The two authentication strategies, built once at startup and shared with
/// the HTTP layer. Choosing which strategy guards which route is left to
/// the caller.
pub struct AuthStrategyRegistry {
    password: Arc<CredentialVerifier>,
    bearer: Arc<TokenValidator>,
    signer: TokenSigner,
    hasher: HashPool,
}

impl AuthStrategyRegistry {
    pub fn new(store: Arc<dyn IdentityStore>, config: &AuthConfig) -> Self {
        let hasher = HashPool::new(config.hash_workers);
        let signer = TokenSigner::new(&config.jwt_secret, config.token_expiry_hours);

        info!(
            hash_workers = hasher.size(),
            token_expiry_hours = config.token_expiry_hours,
            "Registered authentication strategies: {}, {}",
            PASSWORD_STRATEGY,
            BEARER_STRATEGY
        );

        Self {
            password: Arc::new(CredentialVerifier::new(store.clone(), hasher.clone())),
            bearer: Arc::new(TokenValidator::new(store, signer.clone())),
            signer,
            hasher,
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AuthStrategy>> {
        match name {
            PASSWORD_STRATEGY => Some(self.password.clone()),
            BEARER_STRATEGY => Some(self.bearer.clone()),
            _ => None,
        }
    }

    pub fn names(&self) -> [&'static str; 2] {
        [self.password.name(), self.bearer.name()]
    }

    pub fn password(&self) -> &CredentialVerifier {
        &self.password
    }

    pub fn bearer(&self) -> &TokenValidator {
        &self.bearer
    }

    /// Signer used to issue tokens after a successful login.
    pub fn tokens(&self) -> &TokenSigner {
        &self.signer
    }

    pub fn hasher(&self) -> &HashPool {
        &self.hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::strategy::AuthRequest;
    use crate::config::Settings;
    use crate::db::MemoryIdentityStore;
    use crate::error::AuthError;

    fn registry() -> AuthStrategyRegistry {
        let settings = Settings::new_for_test().unwrap();
        AuthStrategyRegistry::new(Arc::new(MemoryIdentityStore::new()), &settings.auth)
    }

    #[test]
    fn test_exactly_two_strategies() {
        let registry = registry();
        assert_eq!(registry.names(), ["password", "bearer-token"]);
        assert_eq!(registry.get("password").map(|s| s.name()), Some("password"));
        assert_eq!(registry.get("bearer-token").map(|s| s.name()), Some("bearer-token"));
        assert!(registry.get("oauth").is_none());
    }

    #[test]
    fn test_hash_pool_sized_from_config() {
        assert_eq!(registry().hasher().size(), 2);
    }

    #[tokio::test]
    async fn test_strategies_by_name() {
        let registry = registry();

        let password = registry.get("password").unwrap();
        let outcome = password.authenticate_request(&AuthRequest::default()).await;
        assert_eq!(outcome.failure_reason(), Some(AuthError::MissingCredentials));

        let bearer = registry.get("bearer-token").unwrap();
        let outcome = bearer.authenticate_request(&AuthRequest::default()).await;
        assert_eq!(outcome.failure_reason(), Some(AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_issued_token_validates_through_registry() {
        let registry = registry();
        let token = registry.tokens().issue("ghost").unwrap();

        let outcome = registry.bearer().validate_token(&token).await;
        assert_eq!(outcome.failure_reason(), Some(AuthError::IdentityRevoked));
    }
}

pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::warn;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthStrategyRegistry, IdentityView, Outcome};
pub use db::{Identity, IdentityStore, MemoryIdentityStore, PgIdentityStore};

/// Health check endpoint handler
/// Reports whether the identity store answers a round-trip.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "timestamp": timestamp,
        })),
        Err(e) => {
            warn!(error = %e, "Health check could not reach the identity store");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unavailable",
                "timestamp": timestamp,
            }))
        }
    }
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn IdentityStore>,
    pub auth: Arc<AuthStrategyRegistry>,
}

impl AppState {
    /// Connects the Postgres identity store and builds the strategy registry.
    pub async fn new(config: Settings) -> Result<Self> {
        let store = PgIdentityStore::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: Settings, store: Arc<dyn IdentityStore>) -> Self {
        let auth = AuthStrategyRegistry::new(store.clone(), &config.auth);

        Self {
            config: Arc::new(config),
            store,
            auth: Arc::new(auth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockIdentityStore;
    use crate::error::DatabaseError;
    use actix_web::{test as actix_test, App};

    #[test]
    fn test_app_state_with_store() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = AppState::with_store(config, Arc::new(MemoryIdentityStore::new()));

        assert_eq!(state.config.environment, "test");
        assert_eq!(state.auth.names(), ["password", "bearer-token"]);
    }

    #[actix_web::test]
    async fn test_health_check_unavailable() {
        let mut store = MockIdentityStore::new();
        store
            .expect_ping()
            .returning(|| Err(DatabaseError::ConnectionError("refused".into())));

        let config = Settings::new_for_test().unwrap();
        let state = web::Data::new(AppState::with_store(config, Arc::new(store)));
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .route("/health", web::get().to(health_check))
        ).await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), 503);

        let json: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(json["status"], "unavailable");
    }
}

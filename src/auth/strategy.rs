use async_trait::async_trait;
use serde_json::Value;

use crate::auth::outcome::Outcome;

/// Transport-neutral view of the parts of a request a strategy may read.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthRequest<'a> {
    pub authorization: Option<&'a str>,
    pub body: Option<&'a Value>,
}

impl<'a> AuthRequest<'a> {
    pub fn with_body(body: &'a Value) -> Self {
        Self { authorization: None, body: Some(body) }
    }

    pub fn with_authorization(header: &'a str) -> Self {
        Self { authorization: Some(header), body: None }
    }
}

/// A named way of turning a request into an [`Outcome`]. Each strategy
/// extracts its own credentials from the request.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn authenticate_request(&self, request: &AuthRequest<'_>) -> Outcome;
}

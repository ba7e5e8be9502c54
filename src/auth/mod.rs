//! Authentication module for the portal server
//!
//! Email/password login, bearer-token validation and safe projection of
//! identities. The HTTP handlers in [`handlers`] are the only consumers of
//! the registry.

mod bearer;
mod credential;
mod hasher;
mod outcome;
mod projector;
mod registry;
mod strategy;
mod token;

pub mod handlers;

pub use bearer::{extract_bearer, TokenValidator, BEARER_STRATEGY};
pub use credential::{CredentialVerifier, LoginCredentials, PASSWORD_STRATEGY};
pub use hasher::HashPool;
pub use outcome::Outcome;
pub use projector::{IdentityView, UserProjector, RESTRICTED_FIELDS};
pub use registry::AuthStrategyRegistry;
pub use strategy::{AuthRequest, AuthStrategy};
pub use token::{Claims, TokenRejection, TokenSigner};
pub use crate::error::AuthError;

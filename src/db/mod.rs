//! Identity store for the authentication service
//!
//! The store is owned by an external collaborator; this crate only reads
//! identity records through the [`IdentityStore`] trait.

pub mod memory;
pub mod models;
pub mod operations;

use async_trait::async_trait;
use crate::error::DatabaseError;

pub use memory::MemoryIdentityStore;
pub use models::Identity;
pub use operations::PgIdentityStore;

/// Read-only lookups against the identity store. Implementations must
/// tolerate concurrent calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DatabaseError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, DatabaseError>;

    /// Round-trip to the backing store, used by the health endpoint.
    async fn ping(&self) -> Result<(), DatabaseError>;
}

//! Group repository trait.

use async_trait::async_trait;
use idm_model::Group;
use uuid::Uuid;

use crate::error::StoreResult;

/// Repository for group storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Creates a new group with the given name.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::Duplicate` if a group with the same name
    /// exists.
    async fn create(&self, name: &str) -> StoreResult<Group>;

    /// Gets a group by ID, or `None` if absent.
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Group>>;

    /// Persists the given group state.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::NotFound` if the group doesn't exist.
    async fn update(&self, group: &Group) -> StoreResult<()>;

    /// Deletes a group by ID.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::NotFound` if the group doesn't exist.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

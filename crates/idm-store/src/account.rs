//! Account repository trait and configuration.

use async_trait::async_trait;
use idm_model::UserAccount;
use uuid::Uuid;

use crate::error::StoreResult;

/// Identity configuration of the backing account store.
///
/// The metadata catalog is computed from this, so it must be fixed for
/// the lifetime of a repository instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountConfig {
    /// Whether the email address doubles as the login name.
    pub email_is_username: bool,
    /// Whether accounts must verify their email before activation.
    pub require_account_verification: bool,
}

impl AccountConfig {
    /// Creates the default configuration (separate username, no
    /// verification requirement).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            email_is_username: false,
            require_account_verification: false,
        }
    }

    /// Uses the email address as the login name.
    #[must_use]
    pub const fn email_as_username(mut self) -> Self {
        self.email_is_username = true;
        self
    }

    /// Requires email verification before account activation.
    #[must_use]
    pub const fn with_verification(mut self) -> Self {
        self.require_account_verification = true;
        self
    }
}

/// Repository for account storage and domain write paths.
///
/// Implementations must be thread-safe and enforce their own
/// consistency (unique usernames, credential policy). Concurrent
/// writes to the same account are resolved by the backend,
/// last-writer-wins or stronger.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// The identity configuration this repository was built with.
    fn config(&self) -> AccountConfig;

    /// Gets an account by ID, or `None` if absent.
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<UserAccount>>;

    /// Creates an account from an identity triple plus a pre-staged
    /// entity carrying any non-identity fields.
    ///
    /// When the configuration uses email as the username, `username`
    /// is `None` and `email` carries the login identifier.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::Duplicate` on a username conflict and
    /// `StoreError::Validation` when the secret or identifier violates
    /// policy.
    async fn create(
        &self,
        username: Option<&str>,
        password: &str,
        email: Option<&str>,
        account: UserAccount,
    ) -> StoreResult<UserAccount>;

    /// Persists the given account state.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    async fn update(&self, account: &UserAccount) -> StoreResult<()>;

    /// Deletes an account by ID.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Renames the account's login name.
    async fn set_username(&self, id: Uuid, username: &str) -> StoreResult<()>;

    /// Sets the password through the backend's credential path.
    async fn set_password(&self, id: Uuid, password: &str) -> StoreResult<()>;

    /// Sets the email address as already confirmed.
    async fn set_confirmed_email(&self, id: Uuid, email: &str) -> StoreResult<()>;

    /// Sets the mobile phone as already confirmed; `None` clears it.
    async fn set_confirmed_phone(&self, id: Uuid, phone: Option<&str>) -> StoreResult<()>;

    /// Sets whether the account may sign in.
    async fn set_login_allowed(&self, id: Uuid, allowed: bool) -> StoreResult<()>;

    /// Adds a claim. Exact duplicates are ignored.
    async fn add_claim(&self, id: Uuid, claim_type: &str, value: &str) -> StoreResult<()>;

    /// Removes claims. With a value, only the exact type/value match
    /// is removed; without one, every claim of the type.
    async fn remove_claim(&self, id: Uuid, claim_type: &str, value: Option<&str>)
        -> StoreResult<()>;
}

//! In-memory reference store.
//!
//! Backs the facade in tests and demos. It enforces presence and
//! uniqueness only; credential policy and durable persistence belong
//! to real backends.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use idm_model::{Group, UserAccount};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::account::{AccountConfig, AccountRepository};
use crate::error::{StoreError, StoreResult};
use crate::group::GroupRepository;
use crate::query::{account_strategy, group_strategy, AccountQuery, GroupQuery};

/// An in-memory account and group store.
///
/// One instance implements all four backing contracts, so a single
/// `Arc<MemoryStore>` can wire a complete facade.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: AccountConfig,
    accounts: RwLock<HashMap<Uuid, UserAccount>>,
    groups: RwLock<HashMap<Uuid, Group>>,
    /// Write-only secrets, kept verbatim. This is a test double: real
    /// backends hash through their own credential path.
    secrets: RwLock<HashMap<Uuid, String>>,
}

impl MemoryStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given identity configuration.
    #[must_use]
    pub fn with_config(config: AccountConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The secret last written for an account. Test support only.
    pub async fn stored_secret(&self, id: Uuid) -> Option<String> {
        self.secrets.read().await.get(&id).cloned()
    }

    /// Number of stored accounts. Test support only.
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    async fn mutate<F>(&self, id: Uuid, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut UserAccount) -> StoreResult<()>,
    {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(StoreError::not_found("Account", id))?;
        f(account)?;
        account.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    fn config(&self) -> AccountConfig {
        self.config
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn create(
        &self,
        username: Option<&str>,
        password: &str,
        email: Option<&str>,
        mut account: UserAccount,
    ) -> StoreResult<UserAccount> {
        if password.trim().is_empty() {
            return Err(StoreError::validation("Password is required"));
        }
        let login = if self.config.email_is_username {
            email
        } else {
            username
        }
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .ok_or_else(|| StoreError::validation("Login identifier is required"))?;

        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.username == login) {
            return Err(StoreError::duplicate("Account", "username", login));
        }

        account.username = login.to_string();
        if let Some(email) = email {
            account.email = Some(email.to_string());
        }
        account.updated_at = Utc::now();
        let id = account.id;
        accounts.insert(id, account.clone());
        drop(accounts);

        self.secrets
            .write()
            .await
            .insert(id, password.to_string());
        tracing::debug!(account_id = %id, username = %account.username, "created account");
        Ok(account)
    }

    async fn update(&self, updated: &UserAccount) -> StoreResult<()> {
        self.mutate(updated.id, |account| {
            *account = updated.clone();
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.accounts
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::not_found("Account", id))?;
        self.secrets.write().await.remove(&id);
        tracing::debug!(account_id = %id, "deleted account");
        Ok(())
    }

    async fn set_username(&self, id: Uuid, username: &str) -> StoreResult<()> {
        if username.trim().is_empty() {
            return Err(StoreError::validation("Username is required"));
        }
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != id && a.username == username)
        {
            return Err(StoreError::duplicate("Account", "username", username));
        }
        let account = accounts
            .get_mut(&id)
            .ok_or(StoreError::not_found("Account", id))?;
        account.username = username.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password: &str) -> StoreResult<()> {
        if password.trim().is_empty() {
            return Err(StoreError::validation("Password is required"));
        }
        if !self.accounts.read().await.contains_key(&id) {
            return Err(StoreError::not_found("Account", id));
        }
        self.secrets
            .write()
            .await
            .insert(id, password.to_string());
        Ok(())
    }

    async fn set_confirmed_email(&self, id: Uuid, email: &str) -> StoreResult<()> {
        if email.trim().is_empty() {
            return Err(StoreError::validation("Email is required"));
        }
        let email_is_username = self.config.email_is_username;
        let mut accounts = self.accounts.write().await;
        if email_is_username
            && accounts.values().any(|a| a.id != id && a.username == email)
        {
            return Err(StoreError::duplicate("Account", "username", email));
        }
        let account = accounts
            .get_mut(&id)
            .ok_or(StoreError::not_found("Account", id))?;
        account.email = Some(email.to_string());
        account.email_verified = true;
        if email_is_username {
            account.username = email.to_string();
        }
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn set_confirmed_phone(&self, id: Uuid, phone: Option<&str>) -> StoreResult<()> {
        self.mutate(id, |account| {
            account.mobile_phone = phone.map(str::to_string);
            Ok(())
        })
        .await
    }

    async fn set_login_allowed(&self, id: Uuid, allowed: bool) -> StoreResult<()> {
        self.mutate(id, |account| {
            account.login_allowed = allowed;
            Ok(())
        })
        .await
    }

    async fn add_claim(&self, id: Uuid, claim_type: &str, value: &str) -> StoreResult<()> {
        self.mutate(id, |account| {
            account.add_claim(claim_type, value);
            Ok(())
        })
        .await
    }

    async fn remove_claim(
        &self,
        id: Uuid,
        claim_type: &str,
        value: Option<&str>,
    ) -> StoreResult<()> {
        self.mutate(id, |account| {
            account.remove_claims(claim_type, value);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AccountQuery for MemoryStore {
    async fn query(
        &self,
        filter: &str,
        start: usize,
        count: usize,
    ) -> StoreResult<(Vec<UserAccount>, usize)> {
        let accounts: Vec<UserAccount> = self.accounts.read().await.values().cloned().collect();
        Ok(account_strategy().run(accounts, filter, start, count))
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, name: &str) -> StoreResult<Group> {
        if name.trim().is_empty() {
            return Err(StoreError::validation("Name is required"));
        }
        let mut groups = self.groups.write().await;
        if groups.values().any(|g| g.name == name) {
            return Err(StoreError::duplicate("Group", "name", name));
        }
        let group = Group::new(name);
        groups.insert(group.id, group.clone());
        tracing::debug!(group_id = %group.id, name = %group.name, "created group");
        Ok(group)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Group>> {
        Ok(self.groups.read().await.get(&id).cloned())
    }

    async fn update(&self, updated: &Group) -> StoreResult<()> {
        let mut groups = self.groups.write().await;
        if groups
            .values()
            .any(|g| g.id != updated.id && g.name == updated.name)
        {
            return Err(StoreError::duplicate("Group", "name", updated.name.clone()));
        }
        let group = groups
            .get_mut(&updated.id)
            .ok_or(StoreError::not_found("Group", updated.id))?;
        *group = updated.clone();
        group.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.groups
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::not_found("Group", id))?;
        tracing::debug!(group_id = %id, "deleted group");
        Ok(())
    }
}

#[async_trait]
impl GroupQuery for MemoryStore {
    async fn query(
        &self,
        filter: &str,
        start: usize,
        count: usize,
    ) -> StoreResult<(Vec<Group>, usize)> {
        let groups: Vec<Group> = self.groups.read().await.values().cloned().collect();
        Ok(group_strategy().run(groups, filter, start, count))
    }
}

//! The admin orchestration facade.
//!
//! [`IdentityManager`] binds the metadata catalog to the backing
//! repositories. It holds no per-request state: the catalog is
//! computed once at build time and only read afterwards, so one
//! instance serves concurrent operations.

use std::sync::Arc;

use idm_model::{claim_types, Group, UserAccount};
use idm_store::{
    AccountConfig, AccountQuery, AccountRepository, GroupQuery, GroupRepository, StoreError,
    StoreResult,
};
use uuid::Uuid;

use crate::dto::{
    CreateResult, MetadataRepresentation, PropertyValue, QueryResult, RoleDetail, RoleSummary,
    UserDetail, UserSummary,
};
use crate::error::{Fault, OpResult};
use crate::metadata::{AccountWrite, GroupWrite, IdentityMetadata};
use crate::property::PropertyDescriptor;
use crate::result::ManagerResult;

/// Error reported for a subject string that is not a valid handle.
const INVALID_SUBJECT: &str = "Invalid subject";

/// Combined storage surface for accounts.
pub trait AccountBackend: AccountRepository + AccountQuery {}
impl<T: AccountRepository + AccountQuery> AccountBackend for T {}

/// Combined storage surface for groups.
pub trait GroupBackend: GroupRepository + GroupQuery {}
impl<T: GroupRepository + GroupQuery> GroupBackend for T {}

/// The catalog wiring point: given the account configuration, whether
/// groups are wired, and the registered extension fields, produce the
/// catalog. Fixed and computed catalogs both plug in here.
pub type MetadataProvider = Box<
    dyn FnOnce(
            AccountConfig,
            bool,
            Vec<PropertyDescriptor<UserAccount, AccountWrite>>,
        ) -> IdentityMetadata
        + Send,
>;

/// Builder for [`IdentityManager`].
pub struct IdentityManagerBuilder {
    accounts: Arc<dyn AccountBackend>,
    groups: Option<Arc<dyn GroupBackend>>,
    account_fields: Vec<PropertyDescriptor<UserAccount, AccountWrite>>,
    metadata: Option<MetadataProvider>,
}

impl IdentityManagerBuilder {
    /// Wires a group backend, enabling the role operations.
    #[must_use]
    pub fn groups(mut self, groups: Arc<dyn GroupBackend>) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Registers an extension field of the account type. It joins the
    /// user update set in registration order.
    #[must_use]
    pub fn account_field(
        mut self,
        descriptor: PropertyDescriptor<UserAccount, AccountWrite>,
    ) -> Self {
        self.account_fields.push(descriptor);
        self
    }

    /// Replaces the catalog computation entirely.
    #[must_use]
    pub fn metadata(mut self, provider: MetadataProvider) -> Self {
        self.metadata = Some(provider);
        self
    }

    /// Computes the catalog and builds the facade.
    #[must_use]
    pub fn build(self) -> IdentityManager {
        let config = self.accounts.config();
        let groups_supported = self.groups.is_some();
        let metadata = match self.metadata {
            Some(provider) => provider(config, groups_supported, self.account_fields),
            None => IdentityMetadata::standard(config, groups_supported, self.account_fields),
        };
        IdentityManager {
            accounts: self.accounts,
            groups: self.groups,
            metadata,
        }
    }
}

/// Metadata-driven admin facade over a membership backend.
pub struct IdentityManager {
    accounts: Arc<dyn AccountBackend>,
    groups: Option<Arc<dyn GroupBackend>>,
    metadata: IdentityMetadata,
}

impl IdentityManager {
    /// Starts building a facade over an account backend.
    #[must_use]
    pub fn builder(accounts: Arc<dyn AccountBackend>) -> IdentityManagerBuilder {
        IdentityManagerBuilder {
            accounts,
            groups: None,
            account_fields: Vec::new(),
            metadata: None,
        }
    }

    /// The active catalog.
    #[must_use]
    pub fn metadata(&self) -> &IdentityMetadata {
        &self.metadata
    }

    /// The catalog's wire projection.
    #[must_use]
    pub fn get_metadata(&self) -> MetadataRepresentation {
        MetadataRepresentation::of(&self.metadata)
    }

    /// Lists users matching `filter`, one page at a time.
    ///
    /// A blank filter matches everything. A negative `start` clamps to
    /// zero, a negative `count` to "all remaining".
    ///
    /// ## Errors
    ///
    /// Returns a [`Fault`] on a backend failure.
    pub async fn query_users(
        &self,
        filter: &str,
        start: i64,
        count: i64,
    ) -> OpResult<QueryResult<UserSummary>> {
        let start = clamp_start(start);
        let count = clamp_count(count);
        let (accounts, total) = self.accounts.query(filter, start, count).await?;
        let items = accounts.into_iter().map(user_summary).collect();
        Ok(ManagerResult::ok(QueryResult::page(
            start,
            total,
            non_blank(filter),
            items,
        )))
    }

    /// Creates a user from a flat property-value list.
    ///
    /// Required create properties are checked up front; nothing is
    /// written when one is missing. Every supplied key must resolve
    /// against the create set — update-only properties are set after
    /// creation, not during it. Non-identity create values are applied
    /// to the staged account before the single store write.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::UnknownPropertyType`] for a key outside the
    /// create set, and a store [`Fault`] on backend failure.
    pub async fn create_user(&self, properties: &[PropertyValue]) -> OpResult<CreateResult> {
        let meta = &self.metadata.user;

        let missing: Vec<String> = meta
            .required_create()
            .filter(|prop| !supplied(properties, prop.prop_type()))
            .map(|prop| format!("{} is required", prop.name()))
            .collect();
        if !missing.is_empty() {
            return Ok(ManagerResult::fail_all(missing));
        }

        let mut username = None;
        let mut password = None;
        let mut email = None;
        let mut staged = UserAccount::new("");
        for value in properties {
            let Some(prop) = meta.create_property(&value.prop_type) else {
                return Err(Fault::UnknownPropertyType(value.prop_type.clone()));
            };
            match value.prop_type.as_str() {
                claim_types::USERNAME => username = value.value.clone(),
                claim_types::PASSWORD => password = value.value.clone(),
                claim_types::EMAIL => email = value.value.clone(),
                _ => {
                    let incoming = value.value.as_deref().unwrap_or_default();
                    match prop.try_set(&staged, incoming) {
                        None => return Err(Fault::UnknownPropertyType(value.prop_type.clone())),
                        Some(Err(rejected)) => {
                            return Ok(ManagerResult::fail(rejected.to_string()))
                        }
                        Some(Ok(write)) => write.stage(&mut staged),
                    }
                }
            }
        }

        // With email-as-username the username property carries the
        // email address.
        let (username, email) = if self.accounts.config().email_is_username {
            (None, username)
        } else {
            (username, email)
        };

        let created = self
            .accounts
            .create(
                username.as_deref(),
                password.as_deref().unwrap_or_default(),
                email.as_deref(),
                staged,
            )
            .await;
        match created {
            Ok(account) => {
                tracing::debug!(user_id = %account.id, username = %account.username, "created user");
                Ok(ManagerResult::ok(CreateResult {
                    subject: account.id.to_string(),
                }))
            }
            Err(error) => fail_or_fault(error),
        }
    }

    /// Gets a user's full projection, or a payload-free success when
    /// no such user exists.
    ///
    /// ## Errors
    ///
    /// Returns a [`Fault`] on a backend failure.
    pub async fn get_user(&self, subject: &str) -> OpResult<UserDetail> {
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        let Some(account) = self.accounts.get_by_id(id).await? else {
            return Ok(ManagerResult::none());
        };

        let properties = self
            .metadata
            .user
            .update_properties
            .iter()
            .filter_map(|prop| {
                prop.try_get(&account)
                    .map(|value| PropertyValue::new(prop.prop_type(), value))
            })
            .collect();
        Ok(ManagerResult::ok(UserDetail {
            subject: id.to_string(),
            username: account.username.clone(),
            name: account.display_name().map(str::to_string),
            properties,
            claims: account.claims,
        }))
    }

    /// Sets one user property through its descriptor.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::UnknownPropertyType`] when the catalog has no
    /// applicable descriptor for `prop_type`, and a store [`Fault`] on
    /// backend failure.
    pub async fn set_user_property(
        &self,
        subject: &str,
        prop_type: &str,
        value: &str,
    ) -> OpResult<()> {
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        let Some(prop) = self.metadata.user.update_property(prop_type) else {
            return Err(Fault::UnknownPropertyType(prop_type.to_string()));
        };
        let Some(account) = self.accounts.get_by_id(id).await? else {
            return Ok(ManagerResult::fail(
                StoreError::not_found("Account", id).to_string(),
            ));
        };

        match prop.try_set(&account, value) {
            None => Err(Fault::UnknownPropertyType(prop_type.to_string())),
            Some(Err(rejected)) => Ok(ManagerResult::fail(rejected.to_string())),
            Some(Ok(write)) => {
                tracing::debug!(user_id = %id, property = prop_type, "setting user property");
                unit_outcome(self.apply_account_write(id, &account, write).await)
            }
        }
    }

    /// Deletes a user.
    ///
    /// ## Errors
    ///
    /// Returns a [`Fault`] on a backend failure.
    pub async fn delete_user(&self, subject: &str) -> OpResult<()> {
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        tracing::debug!(user_id = %id, "deleting user");
        unit_outcome(self.accounts.delete(id).await)
    }

    /// Adds a claim to a user. Exact duplicates are ignored.
    ///
    /// ## Errors
    ///
    /// Returns a [`Fault`] on a backend failure.
    pub async fn add_user_claim(
        &self,
        subject: &str,
        claim_type: &str,
        value: &str,
    ) -> OpResult<()> {
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        unit_outcome(self.accounts.add_claim(id, claim_type, value).await)
    }

    /// Removes the exact type/value claim from a user.
    ///
    /// ## Errors
    ///
    /// Returns a [`Fault`] on a backend failure.
    pub async fn remove_user_claim(
        &self,
        subject: &str,
        claim_type: &str,
        value: &str,
    ) -> OpResult<()> {
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        unit_outcome(
            self.accounts
                .remove_claim(id, claim_type, Some(value))
                .await,
        )
    }

    /// Lists roles matching `filter`, one page at a time.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::GroupsNotSupported`] when no group backend is
    /// wired, and a store [`Fault`] on backend failure.
    pub async fn query_roles(
        &self,
        filter: &str,
        start: i64,
        count: i64,
    ) -> OpResult<QueryResult<RoleSummary>> {
        let groups = self.group_backend()?;
        let start = clamp_start(start);
        let count = clamp_count(count);
        let (page, total) = groups.query(filter, start, count).await?;
        let items = page.into_iter().map(role_summary).collect();
        Ok(ManagerResult::ok(QueryResult::page(
            start,
            total,
            non_blank(filter),
            items,
        )))
    }

    /// Creates a role from a flat property-value list.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::GroupsNotSupported`] when no group backend is
    /// wired, [`Fault::UnknownPropertyType`] for an undeclared key,
    /// and a store [`Fault`] on backend failure.
    pub async fn create_role(&self, properties: &[PropertyValue]) -> OpResult<CreateResult> {
        let groups = self.group_backend()?;
        let meta = &self.metadata.role;

        let missing: Vec<String> = meta
            .required_create()
            .filter(|prop| !supplied(properties, prop.prop_type()))
            .map(|prop| format!("{} is required", prop.name()))
            .collect();
        if !missing.is_empty() {
            return Ok(ManagerResult::fail_all(missing));
        }

        let mut name = None;
        for value in properties {
            if value.prop_type == claim_types::NAME && meta.create_property(&value.prop_type).is_some()
            {
                name = value.value.clone();
            } else if meta.update_property(&value.prop_type).is_none() {
                return Err(Fault::UnknownPropertyType(value.prop_type.clone()));
            }
        }
        let name = name.unwrap_or_default();

        match groups.create(&name).await {
            Ok(group) => {
                tracing::debug!(role_id = %group.id, name = %group.name, "created role");
                Ok(ManagerResult::ok(CreateResult {
                    subject: group.id.to_string(),
                }))
            }
            Err(error) => fail_or_fault(error),
        }
    }

    /// Gets a role's full projection, or a payload-free success when
    /// no such role exists.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::GroupsNotSupported`] when no group backend is
    /// wired, and a store [`Fault`] on backend failure.
    pub async fn get_role(&self, subject: &str) -> OpResult<RoleDetail> {
        let groups = self.group_backend()?;
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        let Some(group) = groups.get_by_id(id).await? else {
            return Ok(ManagerResult::none());
        };

        let properties = self
            .metadata
            .role
            .update_properties
            .iter()
            .filter_map(|prop| {
                prop.try_get(&group)
                    .map(|value| PropertyValue::new(prop.prop_type(), value))
            })
            .collect();
        Ok(ManagerResult::ok(RoleDetail {
            subject: id.to_string(),
            name: group.name,
            properties,
        }))
    }

    /// Sets one role property through its descriptor.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::GroupsNotSupported`] when no group backend is
    /// wired, [`Fault::UnknownPropertyType`] when the catalog has no
    /// applicable descriptor, and a store [`Fault`] on backend
    /// failure.
    pub async fn set_role_property(
        &self,
        subject: &str,
        prop_type: &str,
        value: &str,
    ) -> OpResult<()> {
        let groups = self.group_backend()?;
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        let Some(prop) = self.metadata.role.update_property(prop_type) else {
            return Err(Fault::UnknownPropertyType(prop_type.to_string()));
        };
        let Some(group) = groups.get_by_id(id).await? else {
            return Ok(ManagerResult::fail(
                StoreError::not_found("Group", id).to_string(),
            ));
        };

        match prop.try_set(&group, value) {
            None => Err(Fault::UnknownPropertyType(prop_type.to_string())),
            Some(Err(rejected)) => Ok(ManagerResult::fail(rejected.to_string())),
            Some(Ok(write)) => {
                tracing::debug!(role_id = %id, property = prop_type, "setting role property");
                unit_outcome(apply_group_write(groups.as_ref(), &group, write).await)
            }
        }
    }

    /// Deletes a role.
    ///
    /// ## Errors
    ///
    /// Returns [`Fault::GroupsNotSupported`] when no group backend is
    /// wired, and a store [`Fault`] on backend failure.
    pub async fn delete_role(&self, subject: &str) -> OpResult<()> {
        let groups = self.group_backend()?;
        let Some(id) = parse_subject(subject) else {
            return Ok(ManagerResult::fail(INVALID_SUBJECT));
        };
        tracing::debug!(role_id = %id, "deleting role");
        unit_outcome(groups.delete(id).await)
    }

    fn group_backend(&self) -> Result<&Arc<dyn GroupBackend>, Fault> {
        self.groups.as_ref().ok_or(Fault::GroupsNotSupported)
    }

    async fn apply_account_write(
        &self,
        id: Uuid,
        account: &UserAccount,
        write: AccountWrite,
    ) -> StoreResult<()> {
        match write {
            AccountWrite::Username(username) => self.accounts.set_username(id, &username).await,
            AccountWrite::Password(password) => self.accounts.set_password(id, &password).await,
            AccountWrite::ConfirmedEmail(email) => {
                self.accounts.set_confirmed_email(id, &email).await
            }
            AccountWrite::ConfirmedPhone(phone) => {
                self.accounts.set_confirmed_phone(id, phone.as_deref()).await
            }
            AccountWrite::LoginAllowed(allowed) => {
                self.accounts.set_login_allowed(id, allowed).await
            }
            AccountWrite::DisplayName(name) => {
                self.accounts
                    .remove_claim(id, claim_types::NAME, None)
                    .await?;
                if let Some(name) = name {
                    self.accounts.add_claim(id, claim_types::NAME, &name).await?;
                }
                Ok(())
            }
            AccountWrite::Field(apply) => {
                let mut updated = account.clone();
                apply(&mut updated);
                self.accounts.update(&updated).await
            }
        }
    }
}

async fn apply_group_write(
    groups: &dyn GroupBackend,
    group: &Group,
    write: GroupWrite,
) -> StoreResult<()> {
    match write {
        GroupWrite::Name(name) => {
            let mut updated = group.clone();
            updated.name = name;
            groups.update(&updated).await
        }
    }
}

fn parse_subject(subject: &str) -> Option<Uuid> {
    Uuid::parse_str(subject).ok()
}

fn clamp_start(start: i64) -> usize {
    usize::try_from(start).unwrap_or(0)
}

fn clamp_count(count: i64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}

fn non_blank(filter: &str) -> Option<String> {
    if filter.trim().is_empty() {
        None
    } else {
        Some(filter.to_string())
    }
}

fn supplied(properties: &[PropertyValue], prop_type: &str) -> bool {
    properties.iter().any(|value| {
        value.prop_type == prop_type
            && value
                .value
                .as_deref()
                .is_some_and(|v| !v.trim().is_empty())
    })
}

fn user_summary(account: UserAccount) -> UserSummary {
    UserSummary {
        subject: account.id.to_string(),
        name: account.display_name().map(str::to_string),
        username: account.username,
    }
}

fn role_summary(group: Group) -> RoleSummary {
    RoleSummary {
        subject: group.id.to_string(),
        name: group.name,
    }
}

/// Converts a unit store outcome into the envelope, routing
/// non-validation failures to the fault channel.
fn unit_outcome(result: StoreResult<()>) -> OpResult<()> {
    match result {
        Ok(()) => Ok(ManagerResult::none()),
        Err(error) => fail_or_fault(error),
    }
}

fn fail_or_fault<T>(error: StoreError) -> OpResult<T> {
    if error.is_validation() {
        Ok(ManagerResult::fail(error.to_string()))
    } else {
        Err(Fault::Store(error))
    }
}

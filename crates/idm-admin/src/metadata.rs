//! Metadata catalog.
//!
//! The catalog aggregates property descriptors into create and update
//! sets per entity kind, plus capability flags. It is computed once
//! for a given backing configuration and then only read, so it is safe
//! to share across concurrent operations.

use std::fmt;

use idm_model::{claim_types, Group, UserAccount};
use idm_store::AccountConfig;

use crate::property::{bool_str, parse_bool, PropertyDataType, PropertyDescriptor, ValueError};

/// Property key for the sign-in flag (not claim-backed).
pub const LOGIN_ALLOWED: &str = "login_allowed";

/// In-place entity mutation produced by an extension-field setter.
pub type FieldWrite = Box<dyn FnOnce(&mut UserAccount) + Send>;

/// A deferred write to an account.
///
/// Property setters yield one of these instead of touching the store
/// themselves; the facade routes it to the repository's dedicated
/// write path, or applies it in-memory when the account has not been
/// persisted yet.
pub enum AccountWrite {
    /// Rename the login name.
    Username(String),
    /// Set the password through the credential path.
    Password(String),
    /// Set the email address as already confirmed.
    ConfirmedEmail(String),
    /// Set the confirmed phone number; `None` clears it.
    ConfirmedPhone(Option<String>),
    /// Allow or block sign-in.
    LoginAllowed(bool),
    /// Replace the display-name claim; `None` clears it.
    DisplayName(Option<String>),
    /// Mutate extension state; persisted through a whole-entity
    /// update.
    Field(FieldWrite),
}

impl AccountWrite {
    /// Applies the write to a not-yet-persisted account.
    ///
    /// The password variant is a no-op here: secrets only travel
    /// through the repository's create path.
    pub fn stage(self, account: &mut UserAccount) {
        match self {
            Self::Username(v) => account.username = v,
            Self::Password(_) => {}
            Self::ConfirmedEmail(v) => {
                account.email = Some(v);
                account.email_verified = true;
            }
            Self::ConfirmedPhone(v) => account.mobile_phone = v,
            Self::LoginAllowed(v) => account.login_allowed = v,
            Self::DisplayName(v) => {
                account.remove_claims(claim_types::NAME, None);
                if let Some(v) = v {
                    account.add_claim(claim_types::NAME, v);
                }
            }
            Self::Field(f) => f(account),
        }
    }
}

impl fmt::Debug for AccountWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(v) => f.debug_tuple("Username").field(v).finish(),
            Self::Password(_) => f.write_str("Password(..)"),
            Self::ConfirmedEmail(v) => f.debug_tuple("ConfirmedEmail").field(v).finish(),
            Self::ConfirmedPhone(v) => f.debug_tuple("ConfirmedPhone").field(v).finish(),
            Self::LoginAllowed(v) => f.debug_tuple("LoginAllowed").field(v).finish(),
            Self::DisplayName(v) => f.debug_tuple("DisplayName").field(v).finish(),
            Self::Field(_) => f.write_str("Field(..)"),
        }
    }
}

/// A deferred write to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupWrite {
    /// Rename the group.
    Name(String),
}

/// Create and update property sets plus capability flags for one
/// entity kind.
#[derive(Debug)]
pub struct EntityMetadata<E, W> {
    /// Whether the facade can create entities of this kind.
    pub supports_create: bool,
    /// Whether the facade can delete entities of this kind.
    pub supports_delete: bool,
    /// Whether the facade can mutate claims on this kind.
    pub supports_claims: bool,
    /// Properties collected on creation.
    pub create_properties: Vec<PropertyDescriptor<E, W>>,
    /// The full editable surface.
    pub update_properties: Vec<PropertyDescriptor<E, W>>,
}

impl<E, W> EntityMetadata<E, W> {
    /// Metadata for an unsupported entity kind: no capabilities, no
    /// properties.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            supports_create: false,
            supports_delete: false,
            supports_claims: false,
            create_properties: Vec::new(),
            update_properties: Vec::new(),
        }
    }

    /// Finds a create-set descriptor by its wire key.
    #[must_use]
    pub fn create_property(&self, prop_type: &str) -> Option<&PropertyDescriptor<E, W>> {
        self.create_properties
            .iter()
            .find(|p| p.prop_type() == prop_type)
    }

    /// Finds an update-set descriptor by its wire key.
    #[must_use]
    pub fn update_property(&self, prop_type: &str) -> Option<&PropertyDescriptor<E, W>> {
        self.update_properties
            .iter()
            .find(|p| p.prop_type() == prop_type)
    }

    /// Create-set descriptors that must be supplied.
    pub fn required_create(&self) -> impl Iterator<Item = &PropertyDescriptor<E, W>> {
        self.create_properties.iter().filter(|p| p.required())
    }
}

/// The full property catalog: users plus roles.
#[derive(Debug)]
pub struct IdentityMetadata {
    /// User property catalog.
    pub user: EntityMetadata<UserAccount, AccountWrite>,
    /// Role (group) property catalog.
    pub role: EntityMetadata<Group, GroupWrite>,
    /// Claim type carrying role membership.
    pub role_claim_type: &'static str,
}

impl IdentityMetadata {
    /// Builds the standard catalog for a backing configuration.
    ///
    /// The update set exposes the full editable surface: the identity
    /// fields, phone, display name, the sign-in flag, and any
    /// registered extension fields. The create set is restricted to
    /// the required identity fields, plus email when the configuration
    /// neither uses email as the username nor requires verification.
    #[must_use]
    pub fn standard(
        config: AccountConfig,
        groups_supported: bool,
        account_fields: Vec<PropertyDescriptor<UserAccount, AccountWrite>>,
    ) -> Self {
        let mut update = vec![username_property(config), password_property()];
        let mut create = vec![username_property(config), password_property()];
        if !config.email_is_username {
            update.push(email_property(config.require_account_verification));
            create.push(email_property(config.require_account_verification));
        }

        update.push(phone_property());
        update.push(display_name_property());
        update.push(login_allowed_property());
        update.extend(account_fields);

        let user = EntityMetadata {
            supports_create: true,
            supports_delete: true,
            supports_claims: true,
            create_properties: create,
            update_properties: update,
        };

        let role = if groups_supported {
            EntityMetadata {
                supports_create: true,
                supports_delete: true,
                supports_claims: false,
                create_properties: vec![role_name_property()],
                update_properties: vec![role_name_property()],
            }
        } else {
            EntityMetadata::disabled()
        };

        Self {
            user,
            role,
            role_claim_type: claim_types::ROLE,
        }
    }

    /// Whether a role catalog is present.
    #[must_use]
    pub const fn supports_roles(&self) -> bool {
        self.role.supports_create || self.role.supports_delete
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn username_property(config: AccountConfig) -> PropertyDescriptor<UserAccount, AccountWrite> {
    if config.email_is_username {
        PropertyDescriptor::from_accessors(
            claim_types::USERNAME,
            "Email",
            PropertyDataType::Email,
            true,
            |a: &UserAccount| a.email.clone(),
            |_, v| Ok(AccountWrite::ConfirmedEmail(v.to_string())),
        )
    } else {
        PropertyDescriptor::from_accessors(
            claim_types::USERNAME,
            "Username",
            PropertyDataType::String,
            true,
            |a: &UserAccount| Some(a.username.clone()),
            |_, v| Ok(AccountWrite::Username(v.to_string())),
        )
    }
}

fn password_property() -> PropertyDescriptor<UserAccount, AccountWrite> {
    PropertyDescriptor::from_accessors(
        claim_types::PASSWORD,
        "Password",
        PropertyDataType::Password,
        true,
        |_: &UserAccount| None,
        |_, v| Ok(AccountWrite::Password(v.to_string())),
    )
}

fn email_property(required: bool) -> PropertyDescriptor<UserAccount, AccountWrite> {
    PropertyDescriptor::from_accessors(
        claim_types::EMAIL,
        "Email",
        PropertyDataType::Email,
        required,
        |a: &UserAccount| a.email.clone(),
        |_, v| Ok(AccountWrite::ConfirmedEmail(v.to_string())),
    )
}

fn phone_property() -> PropertyDescriptor<UserAccount, AccountWrite> {
    PropertyDescriptor::from_accessors(
        claim_types::PHONE,
        "Phone",
        PropertyDataType::String,
        false,
        |a: &UserAccount| a.mobile_phone.clone(),
        |_, v| Ok(AccountWrite::ConfirmedPhone(non_blank(v))),
    )
}

fn display_name_property() -> PropertyDescriptor<UserAccount, AccountWrite> {
    PropertyDescriptor::from_accessors(
        claim_types::NAME,
        "Name",
        PropertyDataType::String,
        false,
        |a: &UserAccount| a.display_name().map(str::to_string),
        |_, v| Ok(AccountWrite::DisplayName(non_blank(v))),
    )
}

fn login_allowed_property() -> PropertyDescriptor<UserAccount, AccountWrite> {
    PropertyDescriptor::from_accessors(
        LOGIN_ALLOWED,
        "Login Allowed",
        PropertyDataType::Boolean,
        false,
        |a: &UserAccount| Some(bool_str(a.login_allowed).to_string()),
        |_, v| parse_bool(v).map(AccountWrite::LoginAllowed),
    )
}

fn role_name_property() -> PropertyDescriptor<Group, GroupWrite> {
    PropertyDescriptor::from_accessors(
        claim_types::NAME,
        "Name",
        PropertyDataType::String,
        true,
        |g: &Group| Some(g.name.clone()),
        |_, v| match non_blank(v) {
            Some(name) => Ok(GroupWrite::Name(name)),
            None => Err(ValueError::new("Name is required")),
        },
    )
}

//! User account domain model.
//!
//! Accounts are the primary identity entities managed by the admin
//! facade. They carry profile fields, free-form claims, and a
//! single-valued attribute map for statically registered extension
//! fields.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claim::{claim_types, Claim};

/// A user account.
///
/// The account never holds credential material; passwords are
/// write-only and handled by the backing repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    // === Identity ===
    /// Unique identifier.
    pub id: Uuid,
    /// Unique login name. When the backing configuration uses email as
    /// the username, this mirrors the email address.
    pub username: String,

    // === Profile ===
    /// Email address.
    pub email: Option<String>,
    /// Whether the email has been confirmed.
    pub email_verified: bool,
    /// Mobile phone number.
    pub mobile_phone: Option<String>,
    /// Whether the account may sign in.
    pub login_allowed: bool,

    // === Timestamps ===
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,

    // === Claims ===
    /// Claims attached to this account.
    pub claims: Vec<Claim>,

    // === Extension Fields ===
    /// Single-valued extension attributes, written through statically
    /// registered property accessors.
    pub attributes: HashMap<String, String>,
}

impl UserAccount {
    /// Creates a new account with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            email: None,
            email_verified: false,
            mobile_phone: None,
            login_allowed: true,
            created_at: now,
            updated_at: now,
            claims: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the mobile phone number.
    #[must_use]
    pub fn with_mobile_phone(mut self, phone: impl Into<String>) -> Self {
        self.mobile_phone = Some(phone.into());
        self
    }

    /// Sets whether the account may sign in.
    #[must_use]
    pub const fn with_login_allowed(mut self, allowed: bool) -> Self {
        self.login_allowed = allowed;
        self
    }

    /// Adds a claim.
    #[must_use]
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_claim(claim_type, value);
        self
    }

    /// The display name, read from the first `name` claim.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.claim_values(claim_types::NAME).next()
    }

    /// Values of all claims with the given type, in insertion order.
    pub fn claim_values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.claims
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Checks whether an exact type/value claim is present.
    #[must_use]
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims.iter().any(|c| c.matches(claim_type, value))
    }

    /// Adds a claim. Exact duplicates are ignored.
    pub fn add_claim(&mut self, claim_type: impl Into<String>, value: impl Into<String>) {
        let claim = Claim::new(claim_type, value);
        if !self.has_claim(&claim.claim_type, &claim.value) {
            self.claims.push(claim);
        }
    }

    /// Removes claims by type. With a value, only exact type/value
    /// matches are removed; without one, every claim of the type goes.
    pub fn remove_claims(&mut self, claim_type: &str, value: Option<&str>) {
        self.claims.retain(|c| match value {
            Some(v) => !c.matches(claim_type, v),
            None => c.claim_type != claim_type,
        });
    }

    /// Gets an extension attribute value.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Sets an extension attribute value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }
}

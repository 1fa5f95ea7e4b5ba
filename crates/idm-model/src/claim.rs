//! Claims attached to user accounts.

use serde::{Deserialize, Serialize};

/// A claim (type/value pair) attached to an account.
///
/// Claims are free-form: the admin layer surfaces them verbatim and
/// never interprets values beyond the well-known types in
/// [`claim_types`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type (e.g., `name`, `role`).
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a new claim.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Checks whether this claim matches a type/value pair exactly.
    #[must_use]
    pub fn matches(&self, claim_type: &str, value: &str) -> bool {
        self.claim_type == claim_type && self.value == value
    }
}

/// Well-known claim type keys.
///
/// These double as the stable property keys of the metadata catalog.
pub mod claim_types {
    /// Login name (or email, when email is the username).
    pub const USERNAME: &str = "username";
    /// Display name.
    pub const NAME: &str = "name";
    /// Write-only password placeholder.
    pub const PASSWORD: &str = "password";
    /// Email address.
    pub const EMAIL: &str = "email";
    /// Mobile phone number.
    pub const PHONE: &str = "phone";
    /// Role membership.
    pub const ROLE: &str = "role";
}

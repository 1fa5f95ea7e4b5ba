//! Uniform success/error envelope.

use serde::{Deserialize, Serialize};

/// Outcome of one admin operation as shown to the end user.
///
/// Exactly one side is populated: a success carries an optional
/// payload (absent for unit operations and for "no such entity", which
/// is a normal query outcome, not an error), a failure carries one or
/// more human-readable error strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerResult<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl<T> ManagerResult<T> {
    /// A success carrying a payload.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A success without a payload.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }

    /// A failure with a single error message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![error.into()],
        }
    }

    /// A failure with one or more error messages.
    #[must_use]
    pub fn fail_all(errors: Vec<String>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { data: None, errors }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// The payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consumes the envelope, yielding the payload.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// The error messages (empty on success).
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

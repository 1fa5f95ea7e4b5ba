//! Hard-fault channel of the facade.

use idm_store::StoreError;
use thiserror::Error;

use crate::result::ManagerResult;

/// Failures that are never reported through the per-call envelope.
///
/// These signal a caller/schema desync or an infrastructure problem,
/// not bad user input, and must propagate rather than be swallowed.
#[derive(Debug, Error)]
pub enum Fault {
    /// The requested property type has no descriptor in the active
    /// metadata catalog.
    #[error("Invalid property type {0}")]
    UnknownPropertyType(String),

    /// A role operation was invoked without a configured group
    /// backend. This is a wiring error, deterministic on every call.
    #[error("Groups Not Supported")]
    GroupsNotSupported,

    /// Non-validation failure in the backing store.
    #[error("Store fault: {0}")]
    Store(#[from] StoreError),
}

/// Result of one facade operation.
///
/// `Ok` carries the user-facing envelope, including domain-validation
/// failures; `Err` carries a [`Fault`].
pub type OpResult<T> = Result<ManagerResult<T>, Fault>;

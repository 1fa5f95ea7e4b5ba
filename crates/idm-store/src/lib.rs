//! # idm-store
//!
//! Backing-repository abstraction for the identity admin facade.
//!
//! This crate defines the contracts a membership backend must
//! implement for the facade to manage it:
//!
//! - [`AccountRepository`] - account lifecycle and dedicated write
//!   paths (username rename, confirmed email/phone, password, claims)
//! - [`GroupRepository`] - group lifecycle
//! - [`AccountQuery`] / [`GroupQuery`] - filtered, paged, sorted
//!   listing
//!
//! Consistency (unique usernames, credential policy) is entirely the
//! backend's responsibility; the facade adds no locking of its own.
//! [`MemoryStore`] is the in-process reference backend used by tests.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod account;
pub mod error;
pub mod group;
pub mod memory;
pub mod query;

pub use account::{AccountConfig, AccountRepository};
pub use error::{StoreError, StoreResult};
pub use group::GroupRepository;
pub use memory::MemoryStore;
pub use query::{account_strategy, group_strategy, AccountQuery, GroupQuery, QueryStrategy};

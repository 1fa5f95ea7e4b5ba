//! # idm-model
//!
//! Domain models for the identity admin facade (`UserAccount`, `Group`,
//! `Claim`).
//!
//! This crate defines the entities the admin layer reads and mutates.
//! Credential material never appears here: secrets are write-only and
//! live entirely behind the backing repository.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod account;
pub mod claim;
pub mod group;

pub use account::UserAccount;
pub use claim::{Claim, claim_types};
pub use group::Group;

//! # idm-admin
//!
//! Metadata-driven admin facade over a membership backend.
//!
//! The facade translates a generic admin contract (query, create,
//! update, delete for users and roles, plus claim mutation) into calls
//! against the [`idm_store`] repository traits. A declarative property
//! catalog ([`IdentityMetadata`]) decides which fields exist, how they
//! read and write, and how creation differs from update; the facade
//! itself holds no per-request state.
//!
//! Operations return [`OpResult`]: the `Ok` side is the uniform
//! success/error envelope shown to end users, while the `Err` side
//! ([`Fault`]) carries programmer and infrastructure failures that
//! callers must not swallow.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod dto;
pub mod error;
pub mod manager;
pub mod metadata;
pub mod property;
pub mod result;

pub use dto::{
    CreateResult, EntityMetadataRepresentation, MetadataRepresentation, PropertyRepresentation,
    PropertyValue, QueryResult, RoleDetail, RoleSummary, UserDetail, UserSummary,
};
pub use error::{Fault, OpResult};
pub use manager::{
    AccountBackend, GroupBackend, IdentityManager, IdentityManagerBuilder, MetadataProvider,
};
pub use metadata::{AccountWrite, EntityMetadata, FieldWrite, GroupWrite, IdentityMetadata};
pub use property::{bool_str, parse_bool, PropertyDataType, PropertyDescriptor, ValueError};
pub use result::ManagerResult;

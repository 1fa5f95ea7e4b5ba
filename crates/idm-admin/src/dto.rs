//! Wire shapes of the admin contract.
//!
//! Subjects are opaque strings on the wire; only the facade knows how
//! to resolve them against the store. All shapes serialize camelCase.

use idm_model::Claim;
use serde::{Deserialize, Serialize};

use crate::metadata::{EntityMetadata, IdentityMetadata};
use crate::property::{PropertyDataType, PropertyDescriptor};

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    /// Zero-based offset of the first item.
    pub start: usize,
    /// Number of items in this page.
    pub count: usize,
    /// Matching items before paging.
    pub total: usize,
    /// The filter the page was computed for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// The page itself.
    pub items: Vec<T>,
}

impl<T> QueryResult<T> {
    /// Wraps a page computed by the store.
    #[must_use]
    pub fn page(start: usize, total: usize, filter: Option<String>, items: Vec<T>) -> Self {
        Self {
            start,
            count: items.len(),
            total,
            filter,
            items,
        }
    }
}

/// A property key/value pair as projected onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// The property's wire key.
    #[serde(rename = "type")]
    pub prop_type: String,
    /// The string-normalized value, absent when the property has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PropertyValue {
    /// Creates a property value.
    #[must_use]
    pub fn new(prop_type: impl Into<String>, value: Option<String>) -> Self {
        Self {
            prop_type: prop_type.into(),
            value,
        }
    }
}

/// One user row in a query page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Opaque handle for follow-up operations.
    pub subject: String,
    /// Login name.
    pub username: String,
    /// Display name, when one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Full user projection: identity plus the property and claim lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    /// Opaque handle for follow-up operations.
    pub subject: String,
    /// Login name.
    pub username: String,
    /// Display name, when one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Every applicable catalog property, in catalog order.
    pub properties: Vec<PropertyValue>,
    /// The account's claims, verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<Claim>,
}

/// One role row in a query page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    /// Opaque handle for follow-up operations.
    pub subject: String,
    /// Role name.
    pub name: String,
}

/// Full role projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetail {
    /// Opaque handle for follow-up operations.
    pub subject: String,
    /// Role name.
    pub name: String,
    /// Every applicable catalog property, in catalog order.
    pub properties: Vec<PropertyValue>,
}

/// Payload of a successful create: the new entity's handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
    /// Opaque handle of the created entity.
    pub subject: String,
}

/// Accessor-free projection of one property descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRepresentation {
    /// The property's wire key.
    #[serde(rename = "type")]
    pub prop_type: String,
    /// Display label.
    pub name: String,
    /// Wire data type.
    pub data_type: PropertyDataType,
    /// Whether the property must be supplied on creation.
    pub required: bool,
}

impl PropertyRepresentation {
    /// Projects a descriptor.
    #[must_use]
    pub fn of<E, W>(descriptor: &PropertyDescriptor<E, W>) -> Self {
        Self {
            prop_type: descriptor.prop_type().to_string(),
            name: descriptor.name().to_string(),
            data_type: descriptor.data_type(),
            required: descriptor.required(),
        }
    }
}

/// Accessor-free projection of one entity kind's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadataRepresentation {
    /// Whether the facade can create entities of this kind.
    pub supports_create: bool,
    /// Whether the facade can delete entities of this kind.
    pub supports_delete: bool,
    /// Whether the facade can mutate claims on this kind.
    pub supports_claims: bool,
    /// Properties collected on creation.
    pub create_properties: Vec<PropertyRepresentation>,
    /// The full editable surface.
    pub update_properties: Vec<PropertyRepresentation>,
}

impl EntityMetadataRepresentation {
    /// Projects one entity kind's catalog.
    #[must_use]
    pub fn of<E, W>(metadata: &EntityMetadata<E, W>) -> Self {
        Self {
            supports_create: metadata.supports_create,
            supports_delete: metadata.supports_delete,
            supports_claims: metadata.supports_claims,
            create_properties: metadata
                .create_properties
                .iter()
                .map(PropertyRepresentation::of)
                .collect(),
            update_properties: metadata
                .update_properties
                .iter()
                .map(PropertyRepresentation::of)
                .collect(),
        }
    }
}

/// Accessor-free projection of the full catalog, as consumed by admin
/// UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRepresentation {
    /// User property catalog.
    pub user: EntityMetadataRepresentation,
    /// Role property catalog.
    pub role: EntityMetadataRepresentation,
    /// Claim type carrying role membership.
    pub role_claim_type: String,
}

impl MetadataRepresentation {
    /// Projects the full catalog.
    #[must_use]
    pub fn of(metadata: &IdentityMetadata) -> Self {
        Self {
            user: EntityMetadataRepresentation::of(&metadata.user),
            role: EntityMetadataRepresentation::of(&metadata.role),
            role_claim_type: metadata.role_claim_type.to_string(),
        }
    }
}

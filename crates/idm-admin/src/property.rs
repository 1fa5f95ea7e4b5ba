//! Property descriptors.
//!
//! A descriptor declares one logical field of a managed entity: its
//! stable wire key, display label, data type, required flag, and the
//! accessor pair that binds it to a concrete entity shape. Values
//! cross the descriptor boundary as strings; typed conversion happens
//! only inside the accessors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Data type of a property at the wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyDataType {
    /// Free-form text.
    String,
    /// Email address.
    Email,
    /// Write-only secret; reads always yield no value.
    Password,
    /// `"true"` / `"false"`.
    Boolean,
    /// Integer text.
    Number,
    /// URL text.
    Url,
}

/// A value rejected by a descriptor's data type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValueError(String);

impl ValueError {
    /// Creates a new value error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Parses a boolean wire value (`"true"`/`"false"`, case-insensitive,
/// surrounding whitespace ignored).
///
/// ## Errors
///
/// Returns a [`ValueError`] for anything else.
pub fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ValueError::new(format!("'{value}' is not a boolean"))),
    }
}

/// The normalized wire form of a boolean.
#[must_use]
pub const fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

type Getter<E> = Box<dyn Fn(&E) -> Option<String> + Send + Sync>;
type Setter<E, W> = Box<dyn Fn(&E, &str) -> Result<W, ValueError> + Send + Sync>;

struct Accessors<E, W> {
    get: Getter<E>,
    set: Setter<E, W>,
}

/// Describes one logical field of an entity of shape `E`.
///
/// Setters do not mutate the entity directly; they parse the incoming
/// string and yield a write instruction `W` that the caller applies
/// in-memory (for a not-yet-persisted entity) or through the
/// repository's dedicated write path. A descriptor may also be
/// declaration-only — present in the catalog for the wire contract but
/// without accessors — in which case [`try_get`](Self::try_get) and
/// [`try_set`](Self::try_set) report it as not applicable.
pub struct PropertyDescriptor<E, W> {
    prop_type: String,
    name: String,
    data_type: PropertyDataType,
    required: bool,
    accessors: Option<Accessors<E, W>>,
}

impl<E, W> PropertyDescriptor<E, W> {
    /// Creates a descriptor bound to an accessor pair.
    #[must_use]
    pub fn from_accessors<G, S>(
        prop_type: impl Into<String>,
        name: impl Into<String>,
        data_type: PropertyDataType,
        required: bool,
        get: G,
        set: S,
    ) -> Self
    where
        G: Fn(&E) -> Option<String> + Send + Sync + 'static,
        S: Fn(&E, &str) -> Result<W, ValueError> + Send + Sync + 'static,
    {
        Self {
            prop_type: prop_type.into(),
            name: name.into(),
            data_type,
            required,
            accessors: Some(Accessors {
                get: Box::new(get),
                set: Box::new(set),
            }),
        }
    }

    /// Creates a declaration-only descriptor without accessors.
    #[must_use]
    pub fn declared(
        prop_type: impl Into<String>,
        name: impl Into<String>,
        data_type: PropertyDataType,
        required: bool,
    ) -> Self {
        Self {
            prop_type: prop_type.into(),
            name: name.into(),
            data_type,
            required,
            accessors: None,
        }
    }

    /// The stable wire key.
    #[must_use]
    pub fn prop_type(&self) -> &str {
        &self.prop_type
    }

    /// The display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire data type.
    #[must_use]
    pub const fn data_type(&self) -> PropertyDataType {
        self.data_type
    }

    /// Whether the property must be supplied on creation.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// Whether the descriptor is bound to an accessor pair.
    #[must_use]
    pub const fn has_accessors(&self) -> bool {
        self.accessors.is_some()
    }

    /// Reads the string-normalized value.
    ///
    /// Outer `None` means the descriptor does not apply to this entity
    /// shape (declaration-only); inner `None` means the property has
    /// no value (absent optional field, or a write-only secret).
    #[must_use]
    pub fn try_get(&self, entity: &E) -> Option<Option<String>> {
        self.accessors.as_ref().map(|a| (a.get)(entity))
    }

    /// Parses a new value into a write instruction.
    ///
    /// `None` means the descriptor does not apply to this entity
    /// shape; `Some(Err)` means the value was rejected.
    #[must_use]
    pub fn try_set(&self, entity: &E, value: &str) -> Option<Result<W, ValueError>> {
        self.accessors.as_ref().map(|a| (a.set)(entity, value))
    }
}

impl<E, W> fmt::Debug for PropertyDescriptor<E, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("prop_type", &self.prop_type)
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("required", &self.required)
            .field("bound", &self.accessors.is_some())
            .finish()
    }
}

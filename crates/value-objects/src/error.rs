//! # Errors
//!
//! Every fallible operation in this crate returns [`ValueObjectError`]. The variants
//! follow the failure taxonomy of the mapping layer:
//!
//! - **Configuration**: a dependent property was built without what it needs.
//! - **Mapping**: a persisted column could not be turned back into its sub-object.
//! - **Usage**: a sub-object was read before it was created.
//!
//! Validation failures are *not* errors. They are collected into an
//! [`ErrorBag`](crate::ErrorBag) and merged into the host record.

use crate::codec::CodecError;

/// Boxed cause carried by [`ValueObjectError::Mapping`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the value object layer.
#[derive(Debug, thiserror::Error)]
pub enum ValueObjectError {
    /// A dependent property descriptor is missing a required part.
    #[error("Invalid dependent property: {0}")]
    Configuration(String),

    /// Persisted data for `attribute` could not be decoded or applied.
    #[error("Error on creating object for `{attribute}`: {source}")]
    Mapping {
        attribute: String,
        #[source]
        source: BoxError,
    },

    /// The sub-object for this attribute has not been created in the current epoch.
    #[error("Value object `{0}` has not been created")]
    NotCreated(String),

    /// No factory is registered under this class name.
    #[error("Unknown value object class: {0}")]
    UnknownClass(String),

    /// A sub-object rejected the attributes assigned to it.
    #[error("Cannot assign attributes to {class}: {source}")]
    Assign {
        class: String,
        #[source]
        source: serde_json::Error,
    },

    /// The host record has no attribute with this name.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Encoding a sub-object for storage failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Behavior configuration text could not be parsed.
    #[error("Invalid behavior configuration: {0}")]
    Config(#[source] serde_json::Error),
}

impl ValueObjectError {
    /// Wraps any cause as a mapping failure for `attribute`.
    pub fn mapping(attribute: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Mapping {
            attribute: attribute.into(),
            source: source.into(),
        }
    }

    /// Builds an [`Assign`](Self::Assign) error from a plain message.
    pub fn assign(class: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Assign {
            class: class.into(),
            source: <serde_json::Error as serde::de::Error>::custom(message),
        }
    }

    /// True for errors raised while decoding persisted data.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T, E = ValueObjectError> = std::result::Result<T, E>;

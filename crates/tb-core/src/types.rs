//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Invalid category value.
    #[error("invalid category: {value} (expected growth, maintenance or shrink)")]
    InvalidCategory { value: String },
}

/// How a block of time is classified.
///
/// The set is closed: every entry belongs to exactly one of these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Builds toward a goal.
    Growth,
    /// Necessary upkeep. Entries created without a category land here.
    #[default]
    Maintenance,
    /// Low-value or time-wasting.
    Shrink,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 3] = [Self::Growth, Self::Maintenance, Self::Shrink];

    /// String representation used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Maintenance => "maintenance",
            Self::Shrink => "shrink",
        }
    }

    /// Capitalized label for human-readable output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Growth => "Growth",
            Self::Maintenance => "Maintenance",
            Self::Shrink => "Shrink",
        }
    }

    /// Contribution of one hour in this category to the productivity score.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        match self {
            Self::Growth => 1.0,
            Self::Maintenance => 0.5,
            Self::Shrink => 0.0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "growth" => Ok(Self::Growth),
            "maintenance" => Ok(Self::Maintenance),
            "shrink" => Ok(Self::Shrink),
            _ => Err(ValidationError::InvalidCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated time entry identifier.
    ///
    /// Entry IDs must be non-empty strings. The store assigns a fresh UUID to
    /// every entry it creates, so IDs are unique for the life of the process.
    EntryId, "entry ID"
);

impl EntryId {
    /// Generates a fresh random ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

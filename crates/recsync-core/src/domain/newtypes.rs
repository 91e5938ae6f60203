//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for remote store identifiers.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Maximum length accepted for a class name
const MAX_CLASS_NAME_LEN: usize = 128;

// ============================================================================
// Remote store types
// ============================================================================

/// Name of a record class in the remote store (e.g. `DataStore`, `Customer`)
///
/// Format: starts with an ASCII letter, followed by ASCII letters, digits
/// or underscores, at most 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassName(String);

impl ClassName {
    /// Create a new ClassName
    ///
    /// # Errors
    /// Returns error if the name is empty, too long or contains invalid characters
    pub fn new(name: String) -> Result<Self, DomainError> {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(DomainError::InvalidClassName(
                "Class name cannot be empty".to_string(),
            ));
        };

        if name.len() > MAX_CLASS_NAME_LEN {
            return Err(DomainError::InvalidClassName(format!(
                "Class name exceeds {MAX_CLASS_NAME_LEN} characters: {name}"
            )));
        }

        if !first.is_ascii_alphabetic() {
            return Err(DomainError::InvalidClassName(format!(
                "Class name must start with a letter: {name}"
            )));
        }

        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::InvalidClassName(format!(
                "Class name contains invalid characters: {name}"
            )));
        }

        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClassName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ClassName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ClassName> for String {
    fn from(name: ClassName) -> Self {
        name.0
    }
}

/// Opaque object identity assigned by the remote store (Parse `objectId`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create a new RecordId
    ///
    /// # Errors
    /// Returns error if the ID is empty or cannot be used as a URL path segment
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRecordId(
                "Record ID cannot be empty".to_string(),
            ));
        }

        if id.chars().any(|c| c == '/' || c.is_whitespace()) {
            return Err(DomainError::InvalidRecordId(format!(
                "Record ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RecordId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

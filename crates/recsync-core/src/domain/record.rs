//! Record domain entity
//!
//! A [`Record`] is one schema-less object of a class in the remote store:
//! an ordered bag of string fields plus the three identity fields the store
//! assigns (`id`, `createdAt`, `updatedAt`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::newtypes::{ClassName, RecordId};

/// Reserved name of the identity field
pub const ID_FIELD: &str = "id";

/// Reserved name of the creation timestamp field
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Reserved name of the last-update timestamp field
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Store field that receives an uploaded column literally named `id`
///
/// The store owns `id`, so user data under that name is kept as `ID`.
pub const UPLOADED_ID_FIELD: &str = "ID";

/// Formats a store timestamp the way the store itself reports them
/// (`2024-05-01T10:00:00.000Z`)
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Fields
// ============================================================================

/// Ordered mapping of field name to string value
///
/// Insertion order is preserved; inserting an existing name replaces the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    /// Creates an empty field bag
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or replaces a field, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Returns the value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the field is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// RecordShape
// ============================================================================

/// The class plus the ordered list of recognized field names used when
/// fetching and rendering records
///
/// An empty field list means "every field the store returns".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    class_name: ClassName,
    field_names: Vec<String>,
}

impl RecordShape {
    /// Creates a shape for `class_name` recognizing `field_names`
    pub fn new(class_name: ClassName, field_names: Vec<String>) -> Self {
        Self {
            class_name,
            field_names,
        }
    }

    /// Returns the class name
    pub fn class_name(&self) -> &ClassName {
        &self.class_name
    }

    /// Returns the recognized field names
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Column header for tabular output: the identity fields followed by the
    /// recognized field names
    pub fn header(&self) -> Vec<String> {
        [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD]
            .iter()
            .map(|s| s.to_string())
            .chain(self.field_names.iter().cloned())
            .collect()
    }
}

// ============================================================================
// Record
// ============================================================================

/// One schema-less object instance in a named class of the remote store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Identity assigned by the store (None until first save)
    id: Option<RecordId>,
    /// When the store created the object
    created_at: Option<DateTime<Utc>>,
    /// When the store last updated the object
    updated_at: Option<DateTime<Utc>>,
    /// User fields
    fields: Fields,
}

impl Record {
    /// Creates an unsaved record from its fields
    pub fn new(fields: Fields) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            fields,
        }
    }

    /// Builds the record to save for one uploaded CSV row
    ///
    /// A column literally named `id` is stored as `ID`; every other column
    /// keeps its name.
    pub fn from_upload_row(row: &Fields) -> Self {
        let fields = row
            .iter()
            .map(|(name, value)| {
                let name = if name == ID_FIELD {
                    UPLOADED_ID_FIELD
                } else {
                    name
                };
                (name, value)
            })
            .collect();
        Self::new(fields)
    }

    /// Sets the identity fields assigned by the store
    pub fn with_identity(
        mut self,
        id: RecordId,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.id = Some(id);
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    // --- Getters ---

    /// Returns the store identity, if saved
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// Returns the creation timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the last update timestamp
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns the user fields
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns the user fields mutably
    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Returns the string value of any field, identity fields included
    ///
    /// Absent values render as an empty string.
    pub fn value(&self, name: &str) -> String {
        match name {
            ID_FIELD => self.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            CREATED_AT_FIELD => self.created_at.as_ref().map(format_timestamp).unwrap_or_default(),
            UPDATED_AT_FIELD => self.updated_at.as_ref().map(format_timestamp).unwrap_or_default(),
            _ => self.fields.get(name).unwrap_or_default().to_string(),
        }
    }

    /// Restricts the user fields to the shape's recognized names
    ///
    /// Recognized fields missing from the record become empty strings.
    /// A shape without field names keeps every field.
    pub fn project(self, shape: &RecordShape) -> Self {
        if shape.field_names().is_empty() {
            return self;
        }
        let fields = shape
            .field_names()
            .iter()
            .map(|name| (name.clone(), self.fields.get(name).unwrap_or_default().to_string()))
            .collect();
        Self { fields, ..self }
    }

    /// Values in the order of [`RecordShape::header`]
    pub fn to_row(&self, shape: &RecordShape) -> Vec<String> {
        shape.header().iter().map(|name| self.value(name)).collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry(ID_FIELD, &self.value(ID_FIELD))?;
        map.serialize_entry(CREATED_AT_FIELD, &self.value(CREATED_AT_FIELD))?;
        map.serialize_entry(UPDATED_AT_FIELD, &self.value(UPDATED_AT_FIELD))?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

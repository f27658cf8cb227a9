//! Field schema definitions
//!
//! The declarative schema that drives coercion of raw rows into typed
//! columns. Field order is the canonical output column order.

use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Name of the synthetic positional id column
pub const ID_COLUMN: &str = "id";

/// Ordered set of typed fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    pub fields: Vec<FieldDef>,
}

/// A single declared field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Declared field type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    /// Year-granularity date
    Date,
    Boolean,
    Integer,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl FieldSchema {
    /// Create a schema and validate it
    pub fn new(fields: Vec<FieldDef>) -> Result<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    /// Parse and validate a JSON schema document (`{"fields": [...]}`)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let schema: FieldSchema = serde_json::from_str(json)
            .map_err(|e| Error::Schema(format!("malformed schema document: {}", e)))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check that the schema is non-empty and field names are unique
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::Schema("schema declares no fields".to_string()));
        }

        let mut seen = AHashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(Error::Schema("field with empty name".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::Schema(format!("duplicate field '{}'", field.name)));
            }
        }
        Ok(())
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Field names in declared order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

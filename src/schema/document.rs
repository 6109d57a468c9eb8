//! Form schema document and its structural checks

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::schema::field::{scalar_text, FieldSpec, FieldType};

/// A declarative form: header metadata plus an ordered field list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,

    /// Fields in render order
    pub fields: Vec<FieldSpec>,
}

/// Header keys of a schema document, read separately from `fields`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaHeader {
    #[serde(default, deserialize_with = "scalar_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    description: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    submit_label: Option<String>,
}

/// The schema does not describe a usable form
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema is not a mapping")]
    #[diagnostic(
        code(yamlform::schema::not_a_mapping),
        help("The top level of a form schema must be a mapping with a `fields` key")
    )]
    NotAMapping,

    #[error("schema `fields` is missing or is not a list")]
    #[diagnostic(
        code(yamlform::schema::missing_fields),
        help("Add `fields:` followed by one `- name: ...` entry per field (an empty list `[]` is allowed)")
    )]
    MissingFields,

    #[error("schema header is malformed: {0}")]
    #[diagnostic(code(yamlform::schema::header))]
    MalformedHeader(String),

    #[error("field #{index} is malformed: {message}")]
    #[diagnostic(
        code(yamlform::schema::field),
        help("Each field needs at least a `name`; see the field reference for allowed keys")
    )]
    MalformedField { index: usize, message: String },

    #[error("field #{index} has an empty name")]
    #[diagnostic(code(yamlform::schema::empty_name))]
    EmptyName { index: usize },

    #[error("duplicate field name `{0}`")]
    #[diagnostic(
        code(yamlform::schema::duplicate_name),
        help("Field names are value keys and must be unique within a form")
    )]
    DuplicateField(String),

    #[error("field `{field}` has an invalid pattern: {message}")]
    #[diagnostic(code(yamlform::schema::pattern))]
    InvalidPattern { field: String, message: String },
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = Some(label.into());
        self
    }

    /// Build a schema from an already-parsed YAML document
    ///
    /// Shape errors are reported before field contents so that a missing or
    /// non-list `fields` key is always `MissingFields`.
    pub fn from_value(value: &serde_yml::Value) -> Result<Self, SchemaError> {
        if value.as_mapping().is_none() {
            return Err(SchemaError::NotAMapping);
        }

        let entries = value
            .get("fields")
            .and_then(|f| f.as_sequence())
            .ok_or(SchemaError::MissingFields)?;

        let header: SchemaHeader = serde_yml::from_value(value.clone())
            .map_err(|e| SchemaError::MalformedHeader(e.to_string()))?;

        let fields = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut spec = serde_yml::from_value::<FieldSpec>(entry.clone()).map_err(|e| {
                    SchemaError::MalformedField {
                        index,
                        message: e.to_string(),
                    }
                })?;
                if spec.field_type == FieldType::Unknown {
                    spec.declared_type = entry
                        .get("type")
                        .and_then(|t| t.as_str())
                        .map(str::to_string);
                }
                Ok::<_, SchemaError>(spec)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let schema = Self {
            id: header.id,
            title: header.title,
            description: header.description,
            submit_label: header.submit_label,
            fields,
        };
        schema.check()?;
        Ok(schema)
    }

    /// Verify field names are non-empty and unique
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyName { index });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

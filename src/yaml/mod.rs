//! Schema source - parse schema and values documents from YAML text or files

pub mod diagnostics;

use std::path::Path;
use tracing::debug;

pub use diagnostics::{LoadError, YamlSyntaxError};

use crate::schema::{FieldValue, FormSchema, FormValues, InitialValues};

/// Parse YAML text into an untyped document
pub fn parse_document(text: &str, filename: &str) -> Result<serde_yml::Value, LoadError> {
    serde_yml::from_str(text)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, text, filename).into())
}

/// Parse YAML text into a checked form schema
pub fn parse_schema(text: &str, filename: &str) -> Result<FormSchema, LoadError> {
    let document = parse_document(text, filename)?;
    Ok(FormSchema::from_value(&document)?)
}

/// Parse a values document: a mapping of field name to scalar value
///
/// An empty document yields no values.
pub fn parse_values(text: &str, filename: &str) -> Result<InitialValues, LoadError> {
    let document = parse_document(text, filename)?;
    if document.is_null() {
        return Ok(InitialValues::new());
    }

    serde_yml::from_value::<InitialValues>(document).map_err(|e| LoadError::InvalidValues {
        filename: filename.to_string(),
        message: e.to_string(),
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a document without checking its shape
pub fn load_document(path: &Path) -> Result<serde_yml::Value, LoadError> {
    let text = read(path)?;
    debug!(path = %path.display(), bytes = text.len(), "loaded document");
    parse_document(&text, &path.display().to_string())
}

pub fn load_schema(path: &Path) -> Result<FormSchema, LoadError> {
    let text = read(path)?;
    parse_schema(&text, &path.display().to_string())
}

pub fn load_values(path: &Path) -> Result<InitialValues, LoadError> {
    let text = read(path)?;
    parse_values(&text, &path.display().to_string())
}

/// Serialize values in schema order for output
pub fn ordered_values(schema: &FormSchema, values: &FormValues) -> serde_yml::Mapping {
    let mut out = serde_yml::Mapping::new();
    for field in &schema.fields {
        let value = match values.get(&field.name) {
            // Whole numbers print as integers
            Some(FieldValue::Number(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serde_yml::Value::from(*n as i64)
            }
            Some(other) => match serde_yml::to_value(other) {
                Ok(v) => v,
                Err(_) => continue,
            },
            None => serde_yml::Value::Null,
        };
        out.insert(serde_yml::Value::String(field.name.clone()), value);
    }
    out
}

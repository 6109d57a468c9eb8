//! Schema model - field declarations, form documents, and value types

pub mod document;
pub mod field;
pub mod value;

pub use document::{FormSchema, SchemaError};
pub use field::{FieldSpec, FieldType, OptionValue};
pub use value::{FieldErrors, FieldValue, FileHandle, FormValues, InitialValues};

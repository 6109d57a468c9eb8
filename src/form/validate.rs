//! Field validation
//!
//! A validation pass walks the fields in declared order. Required-but-empty
//! and optional-but-empty short-circuit the remaining rules; otherwise every
//! applicable rule runs and the last one to fail decides the message.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::schema::value::format_number;
use crate::schema::{FieldErrors, FieldSpec, FieldType, FieldValue, FormValues, SchemaError};

pub const REQUIRED_MESSAGE: &str = "This field is required";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"))
}

/// A field with its pattern compiled once at construction
///
/// Patterns go through `fancy_regex` so look-around and backreferences work.
#[derive(Debug, Clone)]
struct CompiledField {
    spec: FieldSpec,
    pattern: Option<fancy_regex::Regex>,
}

/// Validator with compiled field rules
#[derive(Debug, Clone)]
pub struct Validator {
    fields: Vec<CompiledField>,
}

impl Validator {
    /// Compile the rules for a field list
    pub fn new(fields: &[FieldSpec]) -> Result<Self, SchemaError> {
        let fields = fields
            .iter()
            .map(|spec| {
                let pattern = spec
                    .pattern
                    .as_deref()
                    .map(fancy_regex::Regex::new)
                    .transpose()
                    .map_err(|e| SchemaError::InvalidPattern {
                        field: spec.name.clone(),
                        message: e.to_string(),
                    })?;
                Ok(CompiledField {
                    spec: spec.clone(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Self { fields })
    }

    /// Run a full validation pass over `values`
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::default();

        for field in &self.fields {
            let spec = &field.spec;
            let value = values.get(&spec.name).filter(|v| !v.is_empty());

            let Some(value) = value else {
                if spec.required {
                    errors.insert(&spec.name, spec.message.clone().unwrap_or_else(|| REQUIRED_MESSAGE.to_string()));
                }
                continue;
            };

            if let Some(failure) = field.last_failure(value, values) {
                errors.insert(&spec.name, spec.message.clone().unwrap_or(failure));
            }
        }

        debug!(fields = self.fields.len(), errors = errors.len(), "validation pass");
        errors
    }
}

impl CompiledField {
    /// Evaluate every rule in order; the last failing rule wins
    fn last_failure(&self, value: &FieldValue, values: &FormValues) -> Option<String> {
        let spec = &self.spec;
        let text = value.as_str();
        let mut failure = None;

        if spec.field_type == FieldType::Email {
            if let Some(s) = text {
                if !email_regex().is_match(s) {
                    failure = Some("Invalid email address".to_string());
                }
            }
        }

        if let (Some(min), Some(s)) = (spec.min_length.filter(|n| *n > 0.0), text) {
            if (s.chars().count() as f64) < min {
                failure = Some(format!("Minimum length is {}", format_number(min)));
            }
        }

        if let (Some(max), Some(s)) = (spec.max_length.filter(|n| *n > 0.0), text) {
            if (s.chars().count() as f64) > max {
                failure = Some(format!("Maximum length is {}", format_number(max)));
            }
        }

        if let (Some(re), Some(s)) = (&self.pattern, text) {
            let matched = re.is_match(s).unwrap_or_else(|e| {
                warn!(field = %spec.name, error = %e, "pattern gave up matching");
                false
            });
            if !matched {
                failure = Some("Invalid format".to_string());
            }
        }

        if let Some(ref other) = spec.match_field {
            if values.get(other) != Some(value) {
                failure = Some(format!("Must match {}", other));
            }
        }

        if spec.field_type == FieldType::Number {
            if let Some(n) = value.as_f64() {
                if let Some(min) = spec.min.filter(|min| n < *min) {
                    failure = Some(format!("Minimum value is {}", format_number(min)));
                }
                if let Some(max) = spec.max.filter(|max| n > *max) {
                    failure = Some(format!("Maximum value is {}", format_number(max)));
                }
            }
        }

        failure
    }
}

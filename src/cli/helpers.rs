//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::form::{Coercion, RawInput};
use crate::schema::{FieldValue, FormSchema, FormValues, InitialValues};
use crate::yaml;

/// Parse a `name=value` pair for `--set`
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{}`", s)),
    }
}

/// Turn typed text into a value the way the field's own control would
pub fn coerce_for_field(schema: &FormSchema, name: &str, raw: &str) -> FieldValue {
    let coercion = schema
        .field(name)
        .map(|f| Coercion::for_type(f.field_type))
        .unwrap_or(Coercion::Text);
    coercion.apply(RawInput::Text(raw.to_string()))
}

/// Load a `--values` file, or nothing
pub fn load_initial_values(path: Option<&Path>) -> Result<InitialValues> {
    match path {
        Some(path) => Ok(yaml::load_values(path)?),
        None => Ok(InitialValues::new()),
    }
}

/// Resolve `auto` against the configured default
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    match global.format {
        OutputFormat::Auto => match config.default_format.as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        },
        other => other,
    }
}

/// Serialize values in schema field order
pub fn format_values(schema: &FormSchema, values: &FormValues, format: OutputFormat) -> Result<String> {
    let ordered = yaml::ordered_values(schema, values);
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&ordered)
            .map(|json| json + "\n")
            .into_diagnostic(),
        OutputFormat::Yaml | OutputFormat::Auto => serde_yml::to_string(&ordered).into_diagnostic(),
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

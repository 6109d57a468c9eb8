//! YAML load errors with source spans

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

use crate::schema::SchemaError;

/// YAML syntax error pointing into the offending document
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error in {filename}: {message}")]
#[diagnostic(code(yamlform::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    filename: String,
    message: String,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error, locating it in `source`
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = suggest_fix(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            filename: filename.to_string(),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure to obtain a schema or values document
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("could not read {}", .path.display())]
    #[diagnostic(code(yamlform::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error("values in {filename} must be a mapping of field name to value: {message}")]
    #[diagnostic(
        code(yamlform::values::shape),
        help("Write one `field_name: value` line per field; values are strings, numbers, booleans or null")
    )]
    InvalidValues { filename: String, message: String },
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        match source
            .match_indices('\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
        {
            Some(start) => start,
            None => return source.len().saturating_sub(1),
        }
    };

    let line_text = &source[line_start..];
    let line_len = line_text.find('\n').unwrap_or(line_text.len());
    let within = line_text[..line_len]
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_len);

    line_start + within
}

/// Hints for the YAML mistakes people make most often in form schemas
fn suggest_fix(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML indentation must use spaces, not tabs.".to_string());
    }

    if msg.contains("duplicate") {
        return Some("A key appears twice in the same mapping; remove or rename one of them.".to_string());
    }

    if msg.contains("did not find expected '-'") || msg.contains("block sequence") {
        return Some("Every entry under `fields:` starts with `- name: ...` at the same indentation.".to_string());
    }

    if msg.contains("mapping values are not allowed") {
        return Some("Quote values that contain ': ' (for example a `pattern` or `message`).".to_string());
    }

    if msg.contains("found character that cannot start any token") {
        return Some("Values starting with characters like @, ` or % must be quoted.".to_string());
    }

    if msg.contains("expected block end") || msg.contains("could not find expected ':'") {
        return Some("Check the indentation of the keys around this line.".to_string());
    }

    None
}

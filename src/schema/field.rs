//! Field declarations - one entry of a form schema's `fields` list

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::schema::value::{format_number, FieldValue};

/// Declared type of a form field
///
/// Unrecognized type strings deserialize to `Unknown`, which renders like
/// `Text` and has no type-specific validation rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
    Select,
    Textarea,
    Password,
    Email,
    Date,
    Datetime,
    Time,
    Color,
    Range,
    File,
    Url,
    Hidden,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
            FieldType::Password => "password",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Color => "color",
            FieldType::Range => "range",
            FieldType::File => "file",
            FieldType::Url => "url",
            FieldType::Hidden => "hidden",
            FieldType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a select field's `options` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Number(n) => f.write_str(&format_number(*n)),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

/// A single form field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Key into the form's value set; unique within a schema
    #[serde(deserialize_with = "scalar_name")]
    pub name: String,

    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,

    /// Choices for `select` fields, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,

    /// Regular expression the value must contain a match for
    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Name of another field whose value this one must equal
    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub match_field: Option<String>,

    /// MIME filter for file pickers (not validated)
    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,

    /// Replaces the text of any validation error on this field
    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    /// The `type` string as written, kept when it names no known type
    #[serde(skip)]
    pub declared_type: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: None,
            field_type,
            required: false,
            default: None,
            options: Vec::new(),
            min: None,
            max: None,
            step: None,
            min_length: None,
            max_length: None,
            pattern: None,
            match_field: None,
            accept: None,
            message: None,
            placeholder: None,
            help_text: None,
            declared_type: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OptionValue>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length as f64);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length as f64);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_match_field(mut self, other: impl Into<String>) -> Self {
        self.match_field = Some(other.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Type name for display; unknown types show what the schema wrote
    pub fn type_name(&self) -> &str {
        match self.field_type {
            FieldType::Unknown => self.declared_type.as_deref().unwrap_or("unknown"),
            other => other.as_str(),
        }
    }

    /// Label if declared, otherwise the field name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Value used when neither the caller nor the schema supplies one
    pub fn fallback_value(&self) -> FieldValue {
        match self.field_type {
            FieldType::Boolean => FieldValue::Bool(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Short human summary of the declared constraints, e.g. `min=0 max=120`
    pub fn constraint_summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(min) = self.min {
            parts.push(format!("min={}", format_number(min)));
        }
        if let Some(max) = self.max {
            parts.push(format!("max={}", format_number(max)));
        }
        if let Some(step) = self.step {
            parts.push(format!("step={}", format_number(step)));
        }
        if let Some(n) = self.min_length {
            parts.push(format!("minLength={}", format_number(n)));
        }
        if let Some(n) = self.max_length {
            parts.push(format!("maxLength={}", format_number(n)));
        }
        if let Some(ref pattern) = self.pattern {
            parts.push(format!("pattern={}", pattern));
        }
        if let Some(ref other) = self.match_field {
            parts.push(format!("matchField={}", other));
        }
        if !self.options.is_empty() {
            let opts: Vec<String> = self.options.iter().map(ToString::to_string).collect();
            parts.push(format!("options={}", opts.join("|")));
        }
        parts.join(" ")
    }
}

/// Render a YAML scalar as text; `2024` and `true` are as good as strings
fn scalar_to_text(value: &serde_yml::Value) -> Option<String> {
    match value {
        serde_yml::Value::String(s) => Some(s.clone()),
        serde_yml::Value::Number(n) => Some(n.to_string()),
        serde_yml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Optional text attribute written as any scalar; other shapes are dropped
pub(crate) fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yml::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_text))
}

fn scalar_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yml::Value::deserialize(deserializer)?;
    scalar_to_text(&value).ok_or_else(|| de::Error::custom("field name must be a string or number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_yaml() {
        let t: FieldType = serde_yml::from_str("datetime").unwrap();
        assert_eq!(t, FieldType::Datetime);

        let t: FieldType = serde_yml::from_str("signature").unwrap();
        assert_eq!(t, FieldType::Unknown);
    }

    #[test]
    fn test_field_spec_camel_case_keys() {
        let yaml = r#"
name: confirm
type: password
minLength: 8
matchField: password
helpText: Type it again
"#;
        let field: FieldSpec = serde_yml::from_str(yaml).unwrap();
        assert_eq!(field.field_type, FieldType::Password);
        assert_eq!(field.min_length, Some(8.0));
        assert_eq!(field.match_field.as_deref(), Some("password"));
        assert_eq!(field.help_text.as_deref(), Some("Type it again"));
        assert!(!field.required);
    }

    #[test]
    fn test_absent_type_is_text() {
        let field: FieldSpec = serde_yml::from_str("name: nickname").unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.fallback_value(), FieldValue::Text(String::new()));
    }

    #[test]
    fn test_mixed_options() {
        let field: FieldSpec =
            serde_yml::from_str("name: size\ntype: select\noptions: [small, 2, 2.5]").unwrap();
        let shown: Vec<String> = field.options.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["small", "2", "2.5"]);
    }

    #[test]
    fn test_boolean_fallback() {
        let field = FieldSpec::new("enabled", FieldType::Boolean);
        assert_eq!(field.fallback_value(), FieldValue::Bool(false));
    }

    #[test]
    fn test_constraint_summary() {
        let field = FieldSpec::new("age", FieldType::Number).with_min(0.0).with_max(120.0);
        assert_eq!(field.constraint_summary(), "min=0 max=120");
    }

    #[test]
    fn test_numeric_text_attributes() {
        let yaml = r#"
name: 2024
label: 2024
type: number
placeholder: 18
helpText: true
message: 42
"#;
        let field: FieldSpec = serde_yml::from_str(yaml).unwrap();
        assert_eq!(field.name, "2024");
        assert_eq!(field.label.as_deref(), Some("2024"));
        assert_eq!(field.placeholder.as_deref(), Some("18"));
        assert_eq!(field.help_text.as_deref(), Some("true"));
        assert_eq!(field.message.as_deref(), Some("42"));
    }

    #[test]
    fn test_fractional_length_limits() {
        let field: FieldSpec =
            serde_yml::from_str("name: code\nminLength: 2.5\nmaxLength: 10").unwrap();
        assert_eq!(field.min_length, Some(2.5));
        assert_eq!(field.max_length, Some(10.0));
        assert_eq!(field.constraint_summary(), "minLength=2.5 maxLength=10");
    }

    #[test]
    fn test_type_name_keeps_unknown_spelling() {
        let mut field = FieldSpec::new("sig", FieldType::Unknown);
        assert_eq!(field.type_name(), "unknown");
        field.declared_type = Some("signature".to_string());
        assert_eq!(field.type_name(), "signature");
        assert_eq!(FieldSpec::new("n", FieldType::Number).type_name(), "number");
    }
}

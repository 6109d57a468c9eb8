//! Render tree for a form
//!
//! Rendering produces plain data: a `FormNode` with one `FieldNode` per
//! field. Hosts (the terminal prompt, the HTML exporter) walk the tree and
//! route input events back through the `Binding` attached to each field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::value::format_number;
use crate::schema::{FieldSpec, FieldType, FieldValue, FileHandle};

// ============================================================================
// Style slots
// ============================================================================

/// Named places in the tree a caller can attach a class to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleSlot {
    Form,
    Title,
    Description,
    Grid,
    Item,
    Field,
    Label,
    Required,
    Input,
    Select,
    Textarea,
    Checkbox,
    Error,
    Submit,
}

/// Class names per style slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<StyleSlot, String>);

impl StyleMap {
    pub fn with(mut self, slot: StyleSlot, class: impl Into<String>) -> Self {
        self.0.insert(slot, class.into());
        self
    }

    pub fn get(&self, slot: StyleSlot) -> Option<&str> {
        self.0.get(&slot).map(String::as_str)
    }

    pub fn class(&self, slot: StyleSlot) -> Option<String> {
        self.0.get(&slot).cloned()
    }

    /// Overlay `other` onto this map; its entries win
    pub fn merge(&mut self, other: StyleMap) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Controls
// ============================================================================

/// Concrete kind of a single-line input control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Text,
    Number,
    Password,
    Email,
    Date,
    #[serde(rename = "datetime-local")]
    DatetimeLocal,
    Time,
    Color,
    Range,
    Url,
    Hidden,
}

impl ControlKind {
    /// Input kind for a field type; types with dedicated widgets map to text
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Number => ControlKind::Number,
            FieldType::Password => ControlKind::Password,
            FieldType::Email => ControlKind::Email,
            FieldType::Date => ControlKind::Date,
            FieldType::Datetime => ControlKind::DatetimeLocal,
            FieldType::Time => ControlKind::Time,
            FieldType::Color => ControlKind::Color,
            FieldType::Range => ControlKind::Range,
            FieldType::Url => ControlKind::Url,
            FieldType::Hidden => ControlKind::Hidden,
            FieldType::Text
            | FieldType::Boolean
            | FieldType::Select
            | FieldType::Textarea
            | FieldType::File
            | FieldType::Unknown => ControlKind::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Text => "text",
            ControlKind::Number => "number",
            ControlKind::Password => "password",
            ControlKind::Email => "email",
            ControlKind::Date => "date",
            ControlKind::DatetimeLocal => "datetime-local",
            ControlKind::Time => "time",
            ControlKind::Color => "color",
            ControlKind::Range => "range",
            ControlKind::Url => "url",
            ControlKind::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// The widget rendered for a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Checkbox {
        checked: bool,
        class: Option<String>,
    },
    Select {
        value: String,
        options: Vec<SelectOption>,
        class: Option<String>,
    },
    Textarea {
        value: String,
        placeholder: Option<String>,
        class: Option<String>,
    },
    File {
        accept: Option<String>,
        selected: Option<String>,
        class: Option<String>,
    },
    Input {
        input_type: ControlKind,
        value: String,
        placeholder: Option<String>,
        min: Option<String>,
        max: Option<String>,
        step: Option<String>,
        class: Option<String>,
    },
    /// Free-form content produced by a custom renderer
    Custom { content: String },
}

impl Control {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Control::Checkbox { .. } => "checkbox",
            Control::Select { .. } => "select",
            Control::Textarea { .. } => "textarea",
            Control::File { .. } => "file",
            Control::Input { input_type, .. } => input_type.as_str(),
            Control::Custom { .. } => "custom",
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// How a raw control event becomes a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercion {
    Text,
    Number,
    Checkbox,
    FirstFile,
}

/// A raw event as a host delivers it
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Text(String),
    Checked(bool),
    Files(Vec<FileHandle>),
}

impl Coercion {
    /// Coercion applied by the built-in widget for a field type
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Boolean => Coercion::Checkbox,
            FieldType::Number => Coercion::Number,
            FieldType::File => Coercion::FirstFile,
            _ => Coercion::Text,
        }
    }

    pub fn apply(self, raw: RawInput) -> FieldValue {
        match (self, raw) {
            (Coercion::Text, RawInput::Text(s)) => FieldValue::Text(s),
            (Coercion::Text, RawInput::Checked(b)) => FieldValue::Text(b.to_string()),
            (Coercion::Text, RawInput::Files(files)) => FieldValue::Text(
                files.into_iter().next().map(|f| f.name).unwrap_or_default(),
            ),

            (Coercion::Number, RawInput::Text(s)) => FieldValue::Number(coerce_number(&s)),
            (Coercion::Number, RawInput::Checked(b)) => FieldValue::Number(if b { 1.0 } else { 0.0 }),
            (Coercion::Number, RawInput::Files(_)) => FieldValue::Number(f64::NAN),

            (Coercion::Checkbox, RawInput::Checked(b)) => FieldValue::Bool(b),
            (Coercion::Checkbox, RawInput::Text(s)) => FieldValue::Bool(parse_flag(&s)),
            (Coercion::Checkbox, RawInput::Files(files)) => FieldValue::Bool(!files.is_empty()),

            (Coercion::FirstFile, RawInput::Files(files)) => files
                .into_iter()
                .next()
                .map(FieldValue::File)
                .unwrap_or(FieldValue::Null),
            (Coercion::FirstFile, RawInput::Text(s)) if s.trim().is_empty() => FieldValue::Null,
            (Coercion::FirstFile, RawInput::Text(s)) => {
                FieldValue::File(FileHandle::from_path(s.trim()))
            }
            (Coercion::FirstFile, RawInput::Checked(_)) => FieldValue::Null,
        }
    }
}

/// Numeric coercion of free text: blank is 0, unparsable is NaN
///
/// Follows number-input rules rather than Rust literal rules: `0x`/`0o`/`0b`
/// prefixes are accepted, only `Infinity` spells infinity, and `inf`/`nan`
/// are not numbers.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return u64::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Loose yes/no parsing for checkbox values typed as text
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "on" | "x"
    )
}

/// Route from a rendered control back to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub field: String,
    pub coercion: Coercion,
}

/// Handed to custom renderers so their controls can report changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeHandle {
    field: String,
}

impl ChangeHandle {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn bind(&self, coercion: Coercion) -> Binding {
        Binding {
            field: self.field.clone(),
            coercion,
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub text: String,
    pub class: Option<String>,
}

impl TextNode {
    fn new(text: impl Into<String>, class: Option<String>) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelNode {
    pub text: Option<String>,
    pub class: Option<String>,
    /// Class of the required marker; `None` when the field is optional
    pub required: Option<RequiredMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredMarker {
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldNode {
    pub name: String,
    pub class: Option<String>,
    pub label: LabelNode,
    pub control: Control,
    pub help_text: Option<String>,
    pub error: Option<TextNode>,
    pub binding: Option<Binding>,
}

impl FieldNode {
    pub fn is_required(&self) -> bool {
        self.label.required.is_some()
    }

    /// A bare node for custom renderers to fill in
    pub fn custom(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
            label: LabelNode {
                text: None,
                class: None,
                required: None,
            },
            control: Control::Custom {
                content: content.into(),
            },
            help_text: None,
            error: None,
            binding: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemNode {
    pub key: String,
    pub class: Option<String>,
    pub field: FieldNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitNode {
    pub label: String,
    pub class: Option<String>,
}

/// Root of a rendered form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormNode {
    pub id: String,
    pub class: Option<String>,
    pub title: Option<TextNode>,
    pub description: Option<TextNode>,
    pub grid_class: Option<String>,
    pub items: Vec<ItemNode>,
    pub submit: Option<SubmitNode>,
}

/// Custom field rendering hook
pub trait FieldRenderer {
    fn render_field(
        &self,
        field: &FieldSpec,
        value: &FieldValue,
        error: Option<&str>,
        change: &ChangeHandle,
    ) -> FieldNode;
}

impl<F> FieldRenderer for F
where
    F: Fn(&FieldSpec, &FieldValue, Option<&str>, &ChangeHandle) -> FieldNode,
{
    fn render_field(
        &self,
        field: &FieldSpec,
        value: &FieldValue,
        error: Option<&str>,
        change: &ChangeHandle,
    ) -> FieldNode {
        self(field, value, error, change)
    }
}

// ============================================================================
// Built-in widgets
// ============================================================================

/// Render a field with the built-in widget for its type
pub fn render_default(
    field: &FieldSpec,
    value: &FieldValue,
    error: Option<&str>,
    styles: &StyleMap,
) -> FieldNode {
    let control = match field.field_type {
        FieldType::Boolean => Control::Checkbox {
            checked: value.is_truthy(),
            class: styles.class(StyleSlot::Checkbox),
        },
        FieldType::Select => {
            let mut options = vec![SelectOption {
                value: String::new(),
                label: "Select".to_string(),
            }];
            options.extend(field.options.iter().map(|o| SelectOption {
                value: o.to_string(),
                label: o.to_string(),
            }));
            Control::Select {
                value: value.display_value(),
                options,
                class: styles.class(StyleSlot::Select),
            }
        }
        FieldType::Textarea => Control::Textarea {
            value: value.display_value(),
            placeholder: field.placeholder.clone(),
            class: styles.class(StyleSlot::Textarea),
        },
        FieldType::File => Control::File {
            accept: field.accept.clone(),
            selected: match value {
                FieldValue::File(f) => Some(f.name.clone()),
                _ => None,
            },
            class: styles.class(StyleSlot::Input),
        },
        other => Control::Input {
            input_type: ControlKind::for_type(other),
            value: value.display_value(),
            placeholder: field.placeholder.clone(),
            min: field.min.map(format_number),
            max: field.max.map(format_number),
            step: field.step.map(format_number),
            class: styles.class(StyleSlot::Input),
        },
    };

    FieldNode {
        name: field.name.clone(),
        class: styles.class(StyleSlot::Field),
        label: LabelNode {
            text: field.label.clone(),
            class: styles.class(StyleSlot::Label),
            required: field.required.then(|| RequiredMarker {
                class: styles.class(StyleSlot::Required),
            }),
        },
        control,
        help_text: field.help_text.clone(),
        error: error.map(|e| TextNode::new(e, styles.class(StyleSlot::Error))),
        binding: Some(Binding {
            field: field.name.clone(),
            coercion: Coercion::for_type(field.field_type),
        }),
    }
}

pub(crate) fn text_node(text: &Option<String>, class: Option<String>) -> Option<TextNode> {
    text.as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| TextNode::new(t.clone(), class))
}

// ============================================================================
// Plain-text outline
// ============================================================================

impl FormNode {
    /// Deterministic plain-text rendering, one line per field
    pub fn outline(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref title) = self.title {
            lines.push(format!("# {}", title.text));
        }
        if let Some(ref description) = self.description {
            lines.push(description.text.clone());
        }
        if self.title.is_some() || self.description.is_some() {
            lines.push(String::new());
        }

        for item in &self.items {
            lines.extend(item.field.outline_lines());
        }

        if let Some(ref submit) = self.submit {
            if !self.items.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("[ {} ]", submit.label));
        }

        lines.join("\n")
    }
}

impl FieldNode {
    fn outline_lines(&self) -> Vec<String> {
        let label = self.label.text.as_deref().unwrap_or(&self.name);
        let marker = if self.is_required() { " *" } else { "" };
        let mut line = format!("- {}{} ({})", label, marker, self.control.kind_name());

        let shown = match &self.control {
            Control::Checkbox { checked, .. } => Some(if *checked { "[x]" } else { "[ ]" }.to_string()),
            Control::Input {
                input_type: ControlKind::Password,
                value,
                ..
            } => Some("*".repeat(value.chars().count())),
            Control::Input { value, .. }
            | Control::Select { value, .. }
            | Control::Textarea { value, .. } => Some(value.clone()),
            Control::File { selected, .. } => selected.clone(),
            Control::Custom { content } => Some(content.clone()),
        };
        if let Some(shown) = shown.filter(|s| !s.is_empty()) {
            line.push_str(": ");
            line.push_str(&shown);
        }

        let mut lines = vec![line];
        if let Some(ref help) = self.help_text {
            lines.push(format!("    {}", help));
        }
        if let Some(ref error) = self.error {
            lines.push(format!("    ! {}", error.text));
        }
        lines
    }
}

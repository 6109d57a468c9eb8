//! Form engine - owns values and errors, validates, renders, emits events

use std::fmt;
use tracing::{debug, warn};

use crate::form::render::{
    render_default, text_node, Binding, ChangeHandle, FieldRenderer, FormNode, ItemNode, RawInput,
    StyleMap, StyleSlot, SubmitNode,
};
use crate::form::validate::Validator;
use crate::schema::{FieldErrors, FieldValue, FormSchema, FormValues, InitialValues, SchemaError};

/// Callback receiving the current values and whether they are valid
pub type FormCallback = Box<dyn FnMut(&FormValues, bool)>;

const DEFAULT_FORM_ID: &str = "yaml-form";
const DEFAULT_SUBMIT_LABEL: &str = "Save";
pub const INVALID_SCHEMA_MESSAGE: &str = "Invalid schema or missing fields";

/// Construction options for a form engine
pub struct FormOptions {
    pub initial_values: Option<InitialValues>,
    /// Validate after every change (otherwise only on submit)
    pub validate_on_change: bool,
    pub renderer: Option<Box<dyn FieldRenderer>>,
    pub styles: StyleMap,
    pub form_id: Option<String>,
    pub class_name: Option<String>,
    pub on_change: Option<FormCallback>,
    pub on_submit: Option<FormCallback>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            initial_values: None,
            validate_on_change: true,
            renderer: None,
            styles: StyleMap::default(),
            form_id: None,
            class_name: None,
            on_change: None,
            on_submit: None,
        }
    }
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_values(mut self, values: InitialValues) -> Self {
        self.initial_values = Some(values);
        self
    }

    pub fn validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    pub fn with_renderer(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_form_id(mut self, id: impl Into<String>) -> Self {
        self.form_id = Some(id.into());
        self
    }

    pub fn with_class_name(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(&FormValues, bool) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn on_submit(mut self, callback: impl FnMut(&FormValues, bool) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }
}

/// A mounted form: schema, current values, and current errors
pub struct FormEngine {
    schema: FormSchema,
    validator: Validator,
    values: FormValues,
    errors: FieldErrors,
    validate_on_change: bool,
    renderer: Option<Box<dyn FieldRenderer>>,
    styles: StyleMap,
    form_id: Option<String>,
    class_name: Option<String>,
    on_change: Option<FormCallback>,
    on_submit: Option<FormCallback>,
}

impl FormEngine {
    /// Mount a form for `schema`
    ///
    /// Each field starts from the caller's initial value, then the schema
    /// default, then `false` for booleans or `""` for everything else. Null
    /// counts as "not supplied" at every step.
    pub fn new(schema: FormSchema, options: FormOptions) -> Result<Self, SchemaError> {
        schema.check()?;
        let validator = Validator::new(&schema.fields)?;

        let initial = options.initial_values.unwrap_or_default();
        let values: FormValues = schema
            .fields
            .iter()
            .map(|field| {
                let value = initial
                    .get(&field.name)
                    .filter(|v| !v.is_null())
                    .or(field.default.as_ref().filter(|v| !v.is_null()))
                    .cloned()
                    .unwrap_or_else(|| field.fallback_value());
                (field.name.clone(), value)
            })
            .collect();

        debug!(fields = schema.fields.len(), "form mounted");

        Ok(Self {
            schema,
            validator,
            values,
            errors: FieldErrors::default(),
            validate_on_change: options.validate_on_change,
            renderer: options.renderer,
            styles: options.styles,
            form_id: options.form_id,
            class_name: options.class_name,
            on_change: options.on_change,
            on_submit: options.on_submit,
        })
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Errors from the most recent validation pass
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    pub fn validate_on_change(&self) -> bool {
        self.validate_on_change
    }

    /// Whether a submit control is rendered
    pub fn has_submit(&self) -> bool {
        self.on_submit.is_some()
    }

    /// Run a validation pass without touching stored errors
    pub fn validate(&self) -> FieldErrors {
        self.validator.validate(&self.values)
    }

    /// Set one field's value
    pub fn change_field(&mut self, name: &str, value: FieldValue) {
        let next = self.values.with(name, value);
        self.values = next;

        let is_valid = if self.validate_on_change {
            self.errors = self.validator.validate(&self.values);
            self.errors.is_empty()
        } else {
            true
        };

        debug!(field = name, is_valid, "field changed");
        if let Some(ref mut callback) = self.on_change {
            callback(&self.values, is_valid);
        }
    }

    /// Apply a raw control event through its binding
    pub fn dispatch(&mut self, binding: &Binding, raw: RawInput) {
        let value = binding.coercion.apply(raw);
        self.change_field(&binding.field, value);
    }

    /// Validate everything and report to `on_submit`; returns validity
    pub fn submit(&mut self) -> bool {
        self.errors = self.validator.validate(&self.values);
        let is_valid = self.errors.is_empty();

        debug!(is_valid, errors = self.errors.len(), "form submitted");
        if let Some(ref mut callback) = self.on_submit {
            callback(&self.values, is_valid);
        }
        is_valid
    }

    /// Render the current state
    pub fn render(&self) -> FormNode {
        let styles = &self.styles;
        let null = FieldValue::Null;
        let items = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let value = self.values.get(&field.name).unwrap_or(&null);
                let error = self.errors.get(&field.name);
                let node = match self.renderer {
                    Some(ref renderer) => {
                        renderer.render_field(field, value, error, &ChangeHandle::new(&field.name))
                    }
                    None => render_default(field, value, error, styles),
                };
                ItemNode {
                    key: field.name.clone(),
                    class: styles.class(StyleSlot::Item),
                    field: node,
                }
            })
            .collect();

        FormNode {
            id: self
                .form_id
                .clone()
                .or_else(|| self.schema.id.clone())
                .unwrap_or_else(|| DEFAULT_FORM_ID.to_string()),
            class: self.class_name.clone().or_else(|| styles.class(StyleSlot::Form)),
            title: text_node(&self.schema.title, styles.class(StyleSlot::Title)),
            description: text_node(&self.schema.description, styles.class(StyleSlot::Description)),
            grid_class: styles.class(StyleSlot::Grid),
            items,
            submit: self.on_submit.as_ref().map(|_| SubmitNode {
                label: self
                    .schema
                    .submit_label
                    .clone()
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| DEFAULT_SUBMIT_LABEL.to_string()),
                class: styles.class(StyleSlot::Submit),
            }),
        }
    }
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("schema", &self.schema)
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("validate_on_change", &self.validate_on_change)
            .field("custom_renderer", &self.renderer.is_some())
            .finish()
    }
}

/// What a mount produced: a live form, or the invalid-schema state
#[derive(Debug)]
pub enum Form {
    Live(Box<FormEngine>),
    Invalid(SchemaError),
}

/// Output of rendering a mounted form
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Form(FormNode),
    Placeholder(String),
}

impl View {
    pub fn outline(&self) -> String {
        match self {
            View::Form(node) => node.outline(),
            View::Placeholder(text) => text.clone(),
        }
    }
}

impl Form {
    /// Mount from an untyped, already-parsed schema document
    pub fn mount(document: &serde_yml::Value, options: FormOptions) -> Self {
        match FormSchema::from_value(document) {
            Ok(schema) => Self::from_schema(schema, options),
            Err(e) => {
                warn!(error = %e, "schema or schema fields are missing or invalid");
                Form::Invalid(e)
            }
        }
    }

    pub fn from_schema(schema: FormSchema, options: FormOptions) -> Self {
        match FormEngine::new(schema, options) {
            Ok(engine) => Form::Live(Box::new(engine)),
            Err(e) => {
                warn!(error = %e, "schema rejected");
                Form::Invalid(e)
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Form::Live(_))
    }

    pub fn engine(&self) -> Option<&FormEngine> {
        match self {
            Form::Live(engine) => Some(&**engine),
            Form::Invalid(_) => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut FormEngine> {
        match self {
            Form::Live(engine) => Some(&mut **engine),
            Form::Invalid(_) => None,
        }
    }

    pub fn render(&self) -> View {
        match self {
            Form::Live(engine) => View::Form(engine.render()),
            Form::Invalid(_) => View::Placeholder(INVALID_SCHEMA_MESSAGE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::render::{Coercion, Control, FieldNode};
    use crate::schema::{FieldSpec, FieldType, FileHandle};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<(FormValues, bool)>>>;

    fn recorder() -> (Calls, impl FnMut(&FormValues, bool) + 'static) {
        let calls: Calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        (calls, move |values: &FormValues, ok: bool| {
            sink.borrow_mut().push((values.clone(), ok))
        })
    }

    fn age_schema() -> FormSchema {
        FormSchema::new(vec![FieldSpec::new("age", FieldType::Number)
            .with_min(0.0)
            .with_max(120.0)])
    }

    #[test]
    fn test_initial_values_beat_defaults() {
        let schema = FormSchema::new(vec![FieldSpec::new("foo", FieldType::Text).with_default("baz")]);
        let initial = InitialValues::from([("foo".to_string(), FieldValue::from("bar"))]);
        let engine = FormEngine::new(schema, FormOptions::new().with_initial_values(initial)).unwrap();
        assert_eq!(engine.values().get("foo"), Some(&FieldValue::from("bar")));
    }

    #[test]
    fn test_initialization_fallbacks() {
        let schema = FormSchema::new(vec![
            FieldSpec::new("name", FieldType::Text).with_default("anon"),
            FieldSpec::new("enabled", FieldType::Boolean),
            FieldSpec::new("notes", FieldType::Textarea),
            FieldSpec::new("nulled", FieldType::Text).with_default("kept"),
        ]);
        let initial = InitialValues::from([
            ("nulled".to_string(), FieldValue::Null),
            ("stranger".to_string(), FieldValue::from("ignored")),
        ]);
        let engine = FormEngine::new(schema, FormOptions::new().with_initial_values(initial)).unwrap();
        let values = engine.values();

        assert_eq!(values.get("name"), Some(&FieldValue::from("anon")));
        assert_eq!(values.get("enabled"), Some(&FieldValue::Bool(false)));
        assert_eq!(values.get("notes"), Some(&FieldValue::from("")));
        assert_eq!(values.get("nulled"), Some(&FieldValue::from("kept")));
        assert_eq!(values.get("stranger"), None);
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_change_validates_immediately() {
        let (calls, on_change) = recorder();
        let mut engine = FormEngine::new(age_schema(), FormOptions::new().on_change(on_change)).unwrap();

        engine.change_field("age", FieldValue::Number(-1.0));
        assert_eq!(engine.error("age"), Some("Minimum value is 0"));

        engine.change_field("age", FieldValue::Number(30.0));
        assert_eq!(engine.error("age"), None);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].1);
        assert!(calls[1].1);
        assert_eq!(calls[1].0.get("age"), Some(&FieldValue::Number(30.0)));
    }

    #[test]
    fn test_change_produces_new_values_mapping() {
        let mut engine = FormEngine::new(age_schema(), FormOptions::new()).unwrap();
        let before = engine.values().clone();
        engine.change_field("age", FieldValue::Number(5.0));
        assert!(!before.ptr_eq(engine.values()));
        assert_eq!(before.get("age"), Some(&FieldValue::from("")));
    }

    #[test]
    fn test_deferred_validation_leaves_errors_stale() {
        let (calls, on_change) = recorder();
        let options = FormOptions::new().validate_on_change(false).on_change(on_change);
        let mut engine = FormEngine::new(age_schema(), options).unwrap();

        engine.change_field("age", FieldValue::Number(500.0));
        assert!(engine.errors().is_empty());
        assert!(calls.borrow()[0].1);

        assert!(!engine.submit());
        assert_eq!(engine.error("age"), Some("Maximum value is 120"));

        engine.change_field("age", FieldValue::Number(50.0));
        assert_eq!(engine.error("age"), Some("Maximum value is 120"));
    }

    #[test]
    fn test_submit_required_field() {
        let (calls, on_submit) = recorder();
        let schema = FormSchema::new(vec![FieldSpec::new("name", FieldType::Text).required()]);
        let mut engine = FormEngine::new(schema, FormOptions::new().on_submit(on_submit)).unwrap();

        assert!(!engine.submit());
        assert_eq!(engine.error("name"), Some("This field is required"));
        assert!(!calls.borrow()[0].1);
    }

    #[test]
    fn test_submit_twice_is_identical() {
        let (calls, on_submit) = recorder();
        let schema = FormSchema::new(vec![
            FieldSpec::new("mail", FieldType::Email),
            FieldSpec::new("age", FieldType::Number).with_min(18.0),
        ]);
        let initial = InitialValues::from([
            ("mail".to_string(), FieldValue::from("nope")),
            ("age".to_string(), FieldValue::Number(3.0)),
        ]);
        let options = FormOptions::new().with_initial_values(initial).on_submit(on_submit);
        let mut engine = FormEngine::new(schema, options).unwrap();

        let first = engine.submit();
        let first_errors = engine.errors().clone();
        let second = engine.submit();

        assert_eq!(first, second);
        assert_eq!(&first_errors, engine.errors());
        let calls = calls.borrow();
        assert_eq!(calls[0], calls[1]);
        assert_eq!(
            serde_json::to_string(&calls[0].0).unwrap(),
            serde_json::to_string(&calls[1].0).unwrap()
        );
    }

    #[test]
    fn test_empty_schema() {
        let (calls, on_submit) = recorder();
        let mut engine = FormEngine::new(FormSchema::default(), FormOptions::new().on_submit(on_submit)).unwrap();
        let node = engine.render();
        assert!(node.items.is_empty());
        assert!(node.submit.is_some());
        assert!(engine.submit());
        assert!(calls.borrow()[0].1);
    }

    #[test]
    fn test_submit_control_only_with_handler() {
        let engine = FormEngine::new(age_schema(), FormOptions::new()).unwrap();
        assert!(engine.render().submit.is_none());

        let schema = age_schema().with_submit_label("Apply");
        let engine = FormEngine::new(schema, FormOptions::new().on_submit(|_: &FormValues, _| {})).unwrap();
        assert_eq!(engine.render().submit.unwrap().label, "Apply");

        let engine = FormEngine::new(age_schema(), FormOptions::new().on_submit(|_: &FormValues, _| {})).unwrap();
        assert_eq!(engine.render().submit.unwrap().label, "Save");
    }

    #[test]
    fn test_form_id_and_class_precedence() {
        let mut schema = age_schema();
        schema.id = Some("profile".to_string());
        let styles = StyleMap::default().with(StyleSlot::Form, "styled");

        let engine = FormEngine::new(schema.clone(), FormOptions::new().with_styles(styles.clone())).unwrap();
        let node = engine.render();
        assert_eq!(node.id, "profile");
        assert_eq!(node.class.as_deref(), Some("styled"));

        let options = FormOptions::new()
            .with_styles(styles)
            .with_form_id("override")
            .with_class_name("explicit");
        let node = FormEngine::new(schema, options).unwrap().render();
        assert_eq!(node.id, "override");
        assert_eq!(node.class.as_deref(), Some("explicit"));

        let node = FormEngine::new(age_schema(), FormOptions::new()).unwrap().render();
        assert_eq!(node.id, "yaml-form");
    }

    #[test]
    fn test_render_shows_current_error() {
        let mut engine = FormEngine::new(age_schema(), FormOptions::new()).unwrap();
        engine.change_field("age", FieldValue::Number(200.0));
        let node = engine.render();
        let error = node.items[0].field.error.as_ref().unwrap();
        assert_eq!(error.text, "Maximum value is 120");
    }

    #[test]
    fn test_custom_renderer_used_exclusively() {
        let renderer = |field: &crate::schema::FieldSpec,
                        value: &FieldValue,
                        error: Option<&str>,
                        change: &ChangeHandle| {
            let mut node = FieldNode::custom(&field.name, format!("{}={}", field.name, value));
            node.error = error.map(|e| crate::form::render::TextNode {
                text: e.to_string(),
                class: None,
            });
            node.binding = Some(change.bind(Coercion::Text));
            node
        };
        let schema = FormSchema::new(vec![FieldSpec::new("color", FieldType::Color).with_default("red")]);
        let mut engine = FormEngine::new(schema, FormOptions::new().with_renderer(renderer)).unwrap();

        let node = engine.render();
        let field = &node.items[0].field;
        assert_eq!(field.control, Control::Custom { content: "color=red".to_string() });

        let binding = field.binding.clone().unwrap();
        engine.dispatch(&binding, RawInput::Text("blue".into()));
        assert_eq!(engine.values().get("color"), Some(&FieldValue::from("blue")));
    }

    #[test]
    fn test_dispatch_coerces_number_and_file() {
        let schema = FormSchema::new(vec![
            FieldSpec::new("age", FieldType::Number),
            FieldSpec::new("avatar", FieldType::File),
        ]);
        let mut engine = FormEngine::new(schema, FormOptions::new()).unwrap();
        let node = engine.render();
        let age = node.items[0].field.binding.clone().unwrap();
        let avatar = node.items[1].field.binding.clone().unwrap();

        engine.dispatch(&age, RawInput::Text("42".into()));
        assert_eq!(engine.values().get("age"), Some(&FieldValue::Number(42.0)));

        let file = FileHandle { name: "me.png".into(), path: "/tmp/me.png".into(), size: None };
        engine.dispatch(&avatar, RawInput::Files(vec![file.clone()]));
        assert_eq!(engine.values().get("avatar"), Some(&FieldValue::File(file)));

        engine.dispatch(&avatar, RawInput::Files(vec![]));
        assert_eq!(engine.values().get("avatar"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_mount_invalid_schema_renders_placeholder() {
        let document: serde_yml::Value = serde_yml::from_str("title: no fields").unwrap();
        let mut form = Form::mount(&document, FormOptions::new());
        assert!(!form.is_live());
        assert!(form.engine_mut().is_none());
        assert_eq!(form.render(), View::Placeholder(INVALID_SCHEMA_MESSAGE.to_string()));
    }

    #[test]
    fn test_mount_rejects_bad_pattern() {
        let document: serde_yml::Value =
            serde_yml::from_str("fields:\n  - name: x\n    pattern: '[unclosed'").unwrap();
        let form = Form::mount(&document, FormOptions::new());
        assert!(matches!(form, Form::Invalid(SchemaError::InvalidPattern { .. })));
    }

    #[test]
    fn test_mount_live() {
        let document: serde_yml::Value =
            serde_yml::from_str("fields:\n  - name: email\n    type: email").unwrap();
        let mut form = Form::mount(&document, FormOptions::new());
        let engine = form.engine_mut().unwrap();
        engine.change_field("email", FieldValue::from("not-an-email"));
        assert_eq!(engine.error("email"), Some("Invalid email address"));
        engine.change_field("email", FieldValue::from("a@b.co"));
        assert_eq!(engine.error("email"), None);
    }

    #[test]
    fn test_outline_snapshot_after_submit() {
        let mut name = FieldSpec::new("name", FieldType::Text).with_label("Name").required();
        name.help_text = Some("Full name".to_string());
        let schema = FormSchema::new(vec![
            name,
            FieldSpec::new("age", FieldType::Number).with_min(18.0).with_default(30.0),
            FieldSpec::new("pw", FieldType::Password).with_default("abc"),
            FieldSpec::new("admin", FieldType::Boolean),
            FieldSpec::new("plan", FieldType::Select)
                .with_options(["free", "pro"])
                .with_default("pro"),
        ])
        .with_title("Profile")
        .with_description("Tell us about you");

        let mut engine = FormEngine::new(schema, FormOptions::new().on_submit(|_, _| {})).unwrap();
        assert!(!engine.submit());

        insta::assert_snapshot!(engine.render().outline(), @r"
# Profile
Tell us about you

- Name * (text)
    Full name
    ! This field is required
- age (number): 30
- pw (password): ***
- admin (checkbox): [ ]
- plan (select): pro

[ Save ]
");
    }

    #[test]
    fn test_outline_snapshot_placeholder() {
        let schema = FormSchema::new(vec![
            FieldSpec::new("a", FieldType::Text),
            FieldSpec::new("a", FieldType::Number),
        ]);
        let form = Form::from_schema(schema, FormOptions::new());
        insta::assert_snapshot!(form.render().outline(), @"Invalid schema or missing fields");
    }

    #[test]
    fn test_mount_accepts_numeric_text_attributes() {
        let document: serde_yml::Value = serde_yml::from_str(
            "title: 2024\nfields:\n  - name: age\n    label: 2024\n    type: number\n    placeholder: 18",
        )
        .unwrap();
        let form = Form::mount(&document, FormOptions::new());
        let View::Form(node) = form.render() else {
            panic!("numeric text attributes should mount");
        };
        assert_eq!(node.title.map(|t| t.text).as_deref(), Some("2024"));
        assert_eq!(node.items[0].field.label.text.as_deref(), Some("2024"));
        assert!(matches!(
            node.items[0].field.control,
            Control::Input { ref placeholder, .. } if placeholder.as_deref() == Some("18")
        ));
    }

    #[test]
    fn test_mount_accepts_lookahead_pattern() {
        let document: serde_yml::Value = serde_yml::from_str(
            "fields:\n  - name: pw\n    type: password\n    pattern: '^(?=.*[0-9]).{8,}$'",
        )
        .unwrap();
        let mut form = Form::mount(&document, FormOptions::new());
        let engine = form.engine_mut().unwrap();
        engine.change_field("pw", FieldValue::from("password"));
        assert_eq!(engine.error("pw"), Some("Invalid format"));
        engine.change_field("pw", FieldValue::from("passw0rd"));
        assert_eq!(engine.error("pw"), None);
    }
}

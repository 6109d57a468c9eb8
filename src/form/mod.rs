//! Form engine - value state, validation, and rendering
//!
//! A schema is mounted into a [`FormEngine`] (or the invalid-schema state of
//! [`Form`]). Hosts render it to a [`FormNode`] tree, feed input events back
//! through [`FormEngine::dispatch`] or [`FormEngine::change_field`], and call
//! [`FormEngine::submit`] to validate everything.

pub mod engine;
pub mod html;
pub mod render;
pub mod validate;

pub use engine::{Form, FormCallback, FormEngine, FormOptions, View, INVALID_SCHEMA_MESSAGE};
pub use html::{HtmlRenderer, RenderError};
pub use render::{
    Binding, ChangeHandle, Coercion, Control, ControlKind, FieldNode, FieldRenderer, FormNode,
    RawInput, StyleMap, StyleSlot,
};
pub use validate::Validator;

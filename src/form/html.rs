//! HTML export of a rendered form using Tera

use miette::Diagnostic;
use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::form::engine::View;
use crate::form::render::FormNode;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Name ends in `.html` so Tera autoescapes it
const FORM_TEMPLATE: &str = "form.html";

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    #[diagnostic(code(yamlform::html::missing_template))]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    #[diagnostic(code(yamlform::html::render))]
    Render(String),
}

/// Renders form trees as HTML markup
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    /// Create a renderer with the embedded templates
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| RenderError::Render(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    pub fn render_form(&self, form: &FormNode) -> Result<String, RenderError> {
        if !self.tera.get_template_names().any(|n| n == FORM_TEMPLATE) {
            return Err(RenderError::NotFound(FORM_TEMPLATE.to_string()));
        }

        let mut context = tera::Context::new();
        context.insert("form", form);
        self.tera
            .render(FORM_TEMPLATE, &context)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    /// Render a mounted form, or the placeholder paragraph for an invalid one
    pub fn render(&self, view: &View) -> Result<String, RenderError> {
        match view {
            View::Form(node) => self.render_form(node),
            View::Placeholder(text) => Ok(format!("<p>{}</p>", tera::escape_html(text))),
        }
    }
}

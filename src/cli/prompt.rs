//! Interactive terminal host for a form
//!
//! Walks the rendered field nodes, prompting for each control with
//! dialoguer and feeding the answers back through the node bindings, so the
//! terminal behaves like any other host of [`FormEngine`].

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use miette::{IntoDiagnostic, Result};

use crate::form::{Control, ControlKind, FieldNode, FormEngine, RawInput};
use crate::schema::FileHandle;

/// Prompts for every field of a form on the terminal
pub struct TerminalForm {
    theme: ColorfulTheme,
}

impl TerminalForm {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Prompt for all fields, then submit until valid or the user gives up.
    ///
    /// Returns whether the final submission was valid.
    pub fn run(&self, engine: &mut FormEngine) -> Result<bool> {
        let form = engine.render();

        println!();
        match form.title {
            Some(ref title) => println!("{} {}", style("◆").cyan(), style(&title.text).bold()),
            None => println!("{} {}", style("◆").cyan(), style(&form.id).bold()),
        }
        if let Some(ref description) = form.description {
            println!("  {}", style(&description.text).dim());
        }
        println!("{}", style("─".repeat(50)).dim());
        println!();

        let names: Vec<String> = engine.schema().fields.iter().map(|f| f.name.clone()).collect();
        for name in &names {
            self.prompt_field(engine, name)?;
        }

        loop {
            if engine.submit() {
                println!();
                println!("{} All fields valid", style("✓").green());
                return Ok(true);
            }

            println!();
            println!(
                "{} {} field(s) need attention:",
                style("✗").red(),
                engine.errors().len()
            );
            for (name, message) in engine.errors().iter() {
                let label = engine
                    .schema()
                    .field(name)
                    .map(|f| f.display_label().to_string())
                    .unwrap_or_else(|| name.clone());
                println!("  {} {}", style(label).yellow(), message);
            }
            println!();

            let retry = Confirm::with_theme(&self.theme)
                .with_prompt("Fix the invalid fields?")
                .default(true)
                .interact()
                .into_diagnostic()?;
            if !retry {
                return Ok(false);
            }

            let failing: Vec<&String> = names
                .iter()
                .filter(|name| engine.errors().contains(name))
                .collect();
            for name in failing {
                self.prompt_field(engine, name)?;
            }
        }
    }

    /// Prompt for one field using its currently rendered node
    fn prompt_field(&self, engine: &mut FormEngine, name: &str) -> Result<()> {
        let node = match engine.render().items.into_iter().find(|item| item.key == name) {
            Some(item) => item.field,
            None => return Ok(()),
        };

        if let Some(ref error) = node.error {
            println!("  {} {}", style("!").red(), style(&error.text).red());
        }

        let binding = match (&node.control, node.binding.clone()) {
            (Control::Custom { content }, _) => {
                println!("{}", content);
                return Ok(());
            }
            (Control::Input { input_type: ControlKind::Hidden, .. }, _) => return Ok(()),
            (_, Some(binding)) => binding,
            (_, None) => return Ok(()),
        };

        let raw = self.ask(&node)?;
        engine.dispatch(&binding, raw);
        Ok(())
    }

    fn ask(&self, node: &FieldNode) -> Result<RawInput> {
        let prompt = self.format_prompt(node);

        let raw = match &node.control {
            Control::Checkbox { checked, .. } => {
                let answer = Confirm::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .default(*checked)
                    .interact()
                    .into_diagnostic()?;
                RawInput::Checked(answer)
            }

            Control::Select { value, options, .. } => {
                if options.is_empty() {
                    return Ok(RawInput::Text(value.clone()));
                }
                let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                let default_idx = options.iter().position(|o| &o.value == value).unwrap_or(0);
                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(&labels)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;
                RawInput::Text(options[selection].value.clone())
            }

            Control::Input {
                input_type: ControlKind::Password,
                ..
            } => {
                let answer = Password::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .allow_empty_password(true)
                    .interact()
                    .into_diagnostic()?;
                RawInput::Text(answer)
            }

            Control::File { selected, .. } => {
                let answer: String = Input::with_theme(&self.theme)
                    .with_prompt(format!("{} (path)", prompt))
                    .with_initial_text(selected.clone().unwrap_or_default())
                    .allow_empty(true)
                    .interact_text()
                    .into_diagnostic()?;
                let answer = answer.trim();
                if answer.is_empty() {
                    RawInput::Files(Vec::new())
                } else {
                    RawInput::Files(vec![FileHandle::from_path(answer)])
                }
            }

            Control::Input { value, .. } | Control::Textarea { value, .. } => {
                let answer: String = Input::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .with_initial_text(value.clone())
                    .allow_empty(true)
                    .interact_text()
                    .into_diagnostic()?;
                RawInput::Text(answer)
            }

            Control::Custom { .. } => RawInput::Text(String::new()),
        };

        Ok(raw)
    }

    fn format_prompt(&self, node: &FieldNode) -> String {
        let label = node.label.text.clone().unwrap_or_else(|| node.name.clone());
        let label = if node.is_required() {
            format!("{} {}", label, style("*").red())
        } else {
            label
        };

        match node.help_text {
            Some(ref help) => format!("{} ({})", label, style(help).dim()),
            None => label,
        }
    }
}

impl Default for TerminalForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormOptions, StyleMap};
    use crate::form::render::render_default;
    use crate::schema::{FieldSpec, FieldType, FieldValue, FormSchema};

    #[test]
    fn test_format_prompt_uses_label_and_help() {
        let mut field = FieldSpec::new("email", FieldType::Email).with_label("Email address");
        field.help_text = Some("We never share it".to_string());
        let node = render_default(&field, &FieldValue::from(""), None, &StyleMap::default());

        let prompt = TerminalForm::new().format_prompt(&node);
        assert!(prompt.contains("Email address"));
        assert!(prompt.contains("We never share it"));
    }

    #[test]
    fn test_format_prompt_falls_back_to_name() {
        let field = FieldSpec::new("port", FieldType::Number).required();
        let node = render_default(&field, &FieldValue::Number(0.0), None, &StyleMap::default());

        let prompt = TerminalForm::new().format_prompt(&node);
        assert!(prompt.starts_with("port "));
        assert!(prompt.contains('*'));
    }

    #[test]
    fn test_prompt_field_skips_hidden() {
        let schema = FormSchema::new(vec![FieldSpec::new("token", FieldType::Hidden)
            .with_default("abc")]);
        let mut engine = FormEngine::new(schema, FormOptions::new()).unwrap();

        TerminalForm::new().prompt_field(&mut engine, "token").unwrap();
        assert_eq!(engine.values().get("token"), Some(&FieldValue::from("abc")));
    }
}

//! `yamlform check` - validate values against a form without prompting

use console::style;
use miette::{miette, Result};
use std::path::PathBuf;

use crate::cli::helpers::{coerce_for_field, format_values, load_initial_values, parse_assignment, resolve_format};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::form::{Form, FormOptions, INVALID_SCHEMA_MESSAGE};
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Path to the form schema (YAML)
    pub schema: PathBuf,

    /// YAML file of field values
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Set a field, as if typed into its control (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let document = yaml::load_document(&args.schema)?;
    let initial = load_initial_values(args.values.as_deref())?;

    let options = FormOptions::new()
        .with_initial_values(initial)
        .validate_on_change(false);

    let mut engine = match Form::mount(&document, options) {
        Form::Live(engine) => engine,
        Form::Invalid(e) => {
            eprintln!("{} {}", style("✗").red(), INVALID_SCHEMA_MESSAGE);
            return Err(e.into());
        }
    };

    for (name, raw) in &args.set {
        if engine.schema().field(name).is_none() {
            return Err(miette!(
                help = "Run `yamlform inspect` to list the form's fields",
                "no field named `{}` in {}",
                name,
                args.schema.display()
            ));
        }
        let value = coerce_for_field(engine.schema(), name, raw);
        engine.change_field(name, value);
    }

    if engine.submit() {
        if !global.quiet {
            eprintln!(
                "{} {} is valid",
                style("✓").green(),
                style(args.schema.display()).cyan()
            );
        }
        let output = format_values(engine.schema(), engine.values(), resolve_format(global, &config))?;
        print!("{}", output);
        return Ok(());
    }

    for field in &engine.schema().fields {
        if let Some(message) = engine.error(&field.name) {
            eprintln!(
                "{} {}: {}",
                style("✗").red(),
                style(field.display_label()).yellow(),
                message
            );
        }
    }

    Err(miette!(
        "{} field(s) failed validation",
        engine.errors().len()
    ))
}

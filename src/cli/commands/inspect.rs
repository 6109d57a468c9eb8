//! `yamlform inspect` - list a form's fields and constraints

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::form::{FormEngine, FormOptions};
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Path to the form schema (YAML)
    pub schema: PathBuf,
}

pub fn run(args: InspectArgs, global: &GlobalOpts) -> Result<()> {
    let schema = yaml::load_schema(&args.schema)?;
    let engine = FormEngine::new(schema, FormOptions::new())?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&engine.schema().fields).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&engine.schema().fields).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Auto => {
            if !global.quiet {
                let title = engine
                    .schema()
                    .title
                    .clone()
                    .unwrap_or_else(|| args.schema.display().to_string());
                println!("{}", style(title).bold());
                println!();
            }
            println!("{}", fields_table(&engine));
            if !global.quiet {
                println!();
                println!(
                    "{} field(s), {} required",
                    style(engine.schema().fields.len()).cyan(),
                    engine.schema().fields.iter().filter(|f| f.required).count()
                );
            }
        }
    }

    Ok(())
}

/// Markdown table of the form's fields in declaration order
fn fields_table(engine: &FormEngine) -> String {
    let form = engine.render();

    let mut builder = Builder::default();
    builder.push_record(["NAME", "TYPE", "CONTROL", "REQ", "DEFAULT", "CONSTRAINTS"]);
    for (field, item) in engine.schema().fields.iter().zip(&form.items) {
        let default = field
            .default
            .as_ref()
            .map(|d| d.display_value())
            .unwrap_or_default();
        builder.push_record([
            field.name.clone(),
            field.type_name().to_string(),
            item.field.control.kind_name().to_string(),
            if field.required { "yes" } else { "" }.to_string(),
            truncate_str(&default, 20),
            field.constraint_summary(),
        ]);
    }

    builder.build().with(Style::markdown()).to_string()
}

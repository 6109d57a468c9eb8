//! `yamlform fill` - interactive form filling on the terminal

use console::style;
use miette::{bail, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::helpers::{format_values, load_initial_values, resolve_format};
use crate::cli::prompt::TerminalForm;
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::form::{Form, FormOptions, INVALID_SCHEMA_MESSAGE};
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct FillArgs {
    /// Path to the form schema (YAML)
    pub schema: PathBuf,

    /// Start from the values in this YAML file
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Only validate when the form is submitted
    #[arg(long)]
    pub no_validate_on_change: bool,

    /// Write the values to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: FillArgs, global: &GlobalOpts) -> Result<()> {
    if !console::user_attended() {
        bail!("`fill` needs an interactive terminal; use `yamlform check --set` for scripted input");
    }

    let config = Config::load();
    let document = yaml::load_document(&args.schema)?;
    let initial = load_initial_values(args.values.as_deref())?;

    let options = FormOptions::new()
        .with_initial_values(initial)
        .validate_on_change(config.validate_on_change() && !args.no_validate_on_change)
        .with_styles(config.styles.clone())
        .on_submit(|_, is_valid| debug!(is_valid, "terminal form submitted"));

    let mut engine = match Form::mount(&document, options) {
        Form::Live(engine) => engine,
        Form::Invalid(e) => {
            eprintln!("{} {}", style("✗").red(), INVALID_SCHEMA_MESSAGE);
            return Err(e.into());
        }
    };

    let valid = TerminalForm::new().run(&mut engine)?;
    if !valid {
        bail!("form left with {} invalid field(s)", engine.errors().len());
    }

    let output = format_values(engine.schema(), engine.values(), resolve_format(global, &config))?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &output).into_diagnostic()?;
            if !global.quiet {
                eprintln!(
                    "{} Wrote values to {}",
                    style("✓").green(),
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", output),
    }

    Ok(())
}

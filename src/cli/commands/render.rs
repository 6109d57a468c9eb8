//! `yamlform render` - print a form as a text outline or HTML

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::load_initial_values;
use crate::core::config::load_styles;
use crate::core::Config;
use crate::form::{Form, FormOptions, HtmlRenderer};
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Path to the form schema (YAML)
    pub schema: PathBuf,

    /// YAML file of field values to render with
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Render HTML instead of a text outline
    #[arg(long)]
    pub html: bool,

    /// YAML file of `slot: class` entries, layered over the configured styles
    #[arg(long)]
    pub styles: Option<PathBuf>,

    /// Override the form element id
    #[arg(long)]
    pub form_id: Option<String>,

    /// Override the form element class
    #[arg(long)]
    pub class: Option<String>,

    /// Leave out the submit button
    #[arg(long)]
    pub no_submit: bool,

    /// Validate the values before rendering, so errors are shown
    #[arg(long)]
    pub validate: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let config = Config::load();
    let document = yaml::load_document(&args.schema)?;
    let initial = load_initial_values(args.values.as_deref())?;

    let mut styles = config.styles.clone();
    if let Some(ref path) = args.styles {
        let extra = load_styles(path)
            .map_err(|e| miette::miette!("could not load styles from {}: {}", path.display(), e))?;
        styles.merge(extra);
    }

    let mut options = FormOptions::new()
        .with_initial_values(initial)
        .with_styles(styles);
    if let Some(id) = args.form_id {
        options = options.with_form_id(id);
    }
    if let Some(class) = args.class {
        options = options.with_class_name(class);
    }
    if !args.no_submit {
        options = options.on_submit(|_, _| {});
    }

    let mut form = Form::mount(&document, options);
    if args.validate {
        if let Some(engine) = form.engine_mut() {
            engine.submit();
        }
    }

    let view = form.render();
    if args.html {
        let renderer = HtmlRenderer::new()?;
        println!("{}", renderer.render(&view)?);
    } else {
        println!("{}", view.outline());
    }

    match form {
        Form::Live(_) => Ok(()),
        Form::Invalid(e) => Err(e.into()),
    }
}

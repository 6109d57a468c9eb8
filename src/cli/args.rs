//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, fill::FillArgs, inspect::InspectArgs,
    render::RenderArgs,
};

#[derive(Parser)]
#[command(name = "yamlform")]
#[command(author, version, about = "Interactive forms from YAML schemas")]
#[command(long_about = "Render, fill in, and validate configuration forms described by a plain YAML field list.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format for values
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in a form interactively and print the values
    Fill(FillArgs),

    /// Validate values against a form without prompting
    Check(CheckArgs),

    /// Render a form as a text outline or HTML
    Render(RenderArgs),

    /// List a form's fields and their constraints
    Inspect(InspectArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default (yaml unless configured otherwise)
    #[default]
    Auto,
    /// YAML mapping in field order
    Yaml,
    /// JSON object in field order
    Json,
}

//! CLI module - argument parsing, command dispatch, and the terminal form host

pub mod args;
pub mod commands;
pub mod helpers;
pub mod prompt;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

//! CLI command implementations

pub mod check;
pub mod completions;
pub mod fill;
pub mod inspect;
pub mod render;

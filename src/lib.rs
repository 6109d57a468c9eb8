//! yamlform: interactive forms from YAML schemas
//!
//! A form is described by a plain YAML list of typed fields. The library
//! mounts a schema into a [`form::FormEngine`], which owns the value set,
//! validates it, and renders a tree of field nodes for a host to display.
//! The `yamlform` binary hosts forms on the terminal and renders them as
//! text outlines or HTML.

pub mod cli;
pub mod core;
pub mod form;
pub mod schema;
pub mod yaml;

//! Pure command-building logic: escaping, templates, parameter validation.

pub mod command;
pub mod escape;

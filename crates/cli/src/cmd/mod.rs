//! CLI subcommand implementations

pub mod example;
pub mod run;
pub mod validate;

//! CLI commands

pub mod clean;
pub mod comment;
pub mod generate;
pub mod list;

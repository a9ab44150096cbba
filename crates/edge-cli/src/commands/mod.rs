//! CLI subcommands

pub mod list;
pub mod networks;
pub mod query;
pub mod run;

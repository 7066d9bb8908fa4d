//! CLI subcommand implementations.

pub mod leave;
pub mod punch;
pub mod util;

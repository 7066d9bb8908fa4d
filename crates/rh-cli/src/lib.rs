//! Leave calendar and time-card CLI library.
//!
//! This crate provides loading, configuration and rendering on top of `rh-core`.

mod cli;
pub mod commands;
mod config;
pub mod loader;

pub use cli::{Cli, Commands, LeaveAction, PunchCommand};
pub use config::Config;
pub use loader::SourceCache;

// CLI module
//
// This module contains command-line interface functionality:
// - arguments: argument parsing and the one-shot subcommands (check, restore)

pub mod arguments;

pub use arguments::{HostpassArguments, HostpassCommands};

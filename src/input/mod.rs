//! User input handling.
//!
//! Raw text is parsed into a command name and arguments at the boundary, then
//! the arguments are resolved to canonical parameter names.

mod parameters;
mod parser;

pub use parameters::{ArgumentOrigin, ParameterEntry, ParameterSet, ResolvedArgument, resolve};
pub use parser::{ParsedCommand, RawArgument, command_offset, parse_command_line};

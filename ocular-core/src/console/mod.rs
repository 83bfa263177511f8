//! Operator console
//!
//! [`ConsoleCommand::parse`] implements the grammar (`help`, `load <id>`,
//! `unload <id>`, `list`); [`CommandDispatcher`] runs a line against a
//! [`HostProxy`](ocular_api::HostProxy) and reports every problem as a log line.

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{CommandDispatcher, HELP_TEXT};
pub use parser::{CommandError, ConsoleCommand, tokenize};

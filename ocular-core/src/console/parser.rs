//! Console command grammar
//!
//! A line is split with POSIX shell quoting rules, so `load "my plugin.dll"`
//! yields one argument. The first token is the verb; tokens a verb does not
//! consume are ignored.

use thiserror::Error;

/// Usage text for `load`
pub const LOAD_USAGE: &str = "load <plugin.dll>";

/// Usage text for `unload`
pub const UNLOAD_USAGE: &str = "unload <plugin.dll>";

/// Errors produced while parsing a console line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unbalanced quote or dangling escape
    #[error("Invalid command syntax")]
    Syntax,

    /// A verb is missing its required argument
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// One parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Load(String),
    Unload(String),
    List,
    /// Any verb outside the grammar
    Unknown(String),
}

impl ConsoleCommand {
    /// Parse one line of console input.
    ///
    /// Returns `Ok(None)` for a blank line or a line that tokenizes to nothing.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let mut tokens = tokenize(line)?.into_iter();
        let Some(verb) = tokens.next() else {
            return Ok(None);
        };

        let command = match verb.as_str() {
            "help" => Self::Help,
            "list" => Self::List,
            "load" => Self::Load(tokens.next().ok_or(CommandError::Usage(LOAD_USAGE))?),
            "unload" => Self::Unload(tokens.next().ok_or(CommandError::Usage(UNLOAD_USAGE))?),
            _ => Self::Unknown(verb),
        };
        Ok(Some(command))
    }

    /// The verb as typed
    pub fn verb(&self) -> &str {
        match self {
            Self::Help => "help",
            Self::Load(_) => "load",
            Self::Unload(_) => "unload",
            Self::List => "list",
            Self::Unknown(verb) => verb,
        }
    }
}

/// Split a line into tokens using shell quoting rules.
///
/// Malformed quoting is an error; a partial token list is never returned.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    shlex::split(line).ok_or(CommandError::Syntax)
}

//! CommandDispatcher - turns one console line into one host action

use std::sync::Arc;

use ocular_api::event::REQUEST_PLUGIN_LIST;
use ocular_api::{HostProxy, LogLevel};

use super::parser::ConsoleCommand;

/// Text logged for `help`
pub const HELP_TEXT: &str =
    "[console] Commands:\n  load <plugin.dll>\n  unload <plugin.dll>\n  list\n  help";

/// Executes console commands against a host.
///
/// Stateless: every call to [`execute`](Self::execute) stands alone.
#[derive(Clone)]
pub struct CommandDispatcher {
    host: Arc<dyn HostProxy>,
}

impl CommandDispatcher {
    pub fn new(host: Arc<dyn HostProxy>) -> Self {
        Self { host }
    }

    /// Parse and run one line. Problems are reported as host log lines and
    /// never returned.
    pub fn execute(&self, line: &str) {
        match ConsoleCommand::parse(line) {
            Ok(Some(command)) => self.run(command),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(line, error = %err, "Rejected console input");
                self.host.log(LogLevel::Warn, &err.to_string());
            }
        }
    }

    /// Run an already parsed command
    pub fn run(&self, command: ConsoleCommand) {
        tracing::debug!(verb = command.verb(), "Running console command");
        match command {
            ConsoleCommand::Help => self.host.log(LogLevel::Info, HELP_TEXT),
            ConsoleCommand::Load(name) => {
                self.host
                    .log(LogLevel::Info, &format!("Loading plugin: {name}"));
                if !self.host.load_plugin(&name) {
                    self.host
                        .log(LogLevel::Warn, &format!("Failed to load plugin: {name}"));
                }
            }
            ConsoleCommand::Unload(name) => {
                self.host
                    .log(LogLevel::Info, &format!("Unloading plugin: {name}"));
                if !self.host.unload_plugin(&name) {
                    self.host
                        .log(LogLevel::Warn, &format!("Failed to unload plugin: {name}"));
                }
            }
            ConsoleCommand::List => self.host.send_event(REQUEST_PLUGIN_LIST, ""),
            ConsoleCommand::Unknown(verb) => self
                .host
                .log(LogLevel::Warn, &format!("Unknown command: {verb}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocular_api::mock::RecordingHost;

    fn setup() -> (Arc<RecordingHost>, CommandDispatcher) {
        let host = Arc::new(RecordingHost::new());
        let dispatcher = CommandDispatcher::new(host.clone());
        (host, dispatcher)
    }

    #[test]
    fn test_blank_line_does_nothing() {
        let (host, console) = setup();
        console.execute("");
        console.execute("    ");
        assert!(host.logs().is_empty());
        assert!(host.sent_events().is_empty());
    }

    #[test]
    fn test_help_logs_fixed_text() {
        let (host, console) = setup();
        console.execute("help");
        assert_eq!(host.logs(), vec![(LogLevel::Info, HELP_TEXT.to_string())]);
    }

    #[test]
    fn test_load_without_argument_warns_usage() {
        let (host, console) = setup();
        console.execute("load");
        assert_eq!(
            host.logs(),
            vec![(LogLevel::Warn, "Usage: load <plugin.dll>".to_string())]
        );
        assert!(host.loads().is_empty());
    }

    #[test]
    fn test_unload_logs_and_calls_host() {
        let (host, console) = setup();
        console.execute("unload echo.dll");
        assert_eq!(
            host.logs(),
            vec![(LogLevel::Info, "Unloading plugin: echo.dll".to_string())]
        );
        assert_eq!(host.unloads(), vec!["echo.dll"]);
    }

    #[test]
    fn test_failed_load_is_warned_not_escalated() {
        let (host, console) = setup();
        host.set_load_result(false);

        console.execute("load missing.dll");

        assert_eq!(
            host.logs(),
            vec![
                (LogLevel::Info, "Loading plugin: missing.dll".to_string()),
                (LogLevel::Warn, "Failed to load plugin: missing.dll".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_verb_warns() {
        let (host, console) = setup();
        console.execute("frobnicate now");
        assert_eq!(
            host.logs(),
            vec![(LogLevel::Warn, "Unknown command: frobnicate".to_string())]
        );
    }
}

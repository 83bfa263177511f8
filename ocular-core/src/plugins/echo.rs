use ocular_api::event::{CHAT_MESSAGE, CHAT_REPLY};
use ocular_api::{PluginError, PluginManifest};

use super::Plugin;
use crate::adapter::ScriptAdapter;

/// Replies to every `chatMessage` with `chatReply` = `Echo: <payload>`
#[derive(Debug, Default)]
pub struct EchoPlugin;

impl Plugin for EchoPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest::new("echo", "1.0.0")
    }

    fn on_load(&mut self, adapter: &ScriptAdapter) -> Result<(), PluginError> {
        let this = adapter.clone();
        adapter.subscribe(CHAT_MESSAGE, move |_: &str, payload: &str| {
            this.info(&format!("Received chat: {payload}"));
            this.send(CHAT_REPLY, &format!("Echo: {payload}"));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDispatcher;
    use ocular_api::mock::RecordingHost;
    use ocular_api::{LogLevel, PluginInstanceId};
    use std::sync::Arc;

    #[test]
    fn test_echo_replies() {
        let host = Arc::new(RecordingHost::new());
        let adapter = ScriptAdapter::new(
            PluginInstanceId::new(1),
            "echo",
            host.clone(),
            Arc::new(EventDispatcher::new()),
        );
        EchoPlugin.on_load(&adapter).unwrap();

        host.raise(CHAT_MESSAGE, "hi there");

        assert_eq!(
            host.logs_at(LogLevel::Info),
            vec!["Received chat: hi there".to_string()]
        );
        assert_eq!(
            host.sent_events(),
            vec![(CHAT_REPLY.to_string(), "Echo: hi there".to_string())]
        );
        adapter.shutdown();
    }
}

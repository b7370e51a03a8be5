// Message bridge: turns inbound extension messages into exactly one encoded reply each.
//
// Pipeline per message
// - decode the payload into a Command
// - process it for the current session, bounded by a deadline
// - fold every failure into Event::CommandRejected
// - encode the event and deliver it through the envelope's reply handle
//
// Messages without a payload are not answered.

use crate::modules::background::core::codec::{CodecError, decode_command, encode_event};
use crate::modules::background::core::events::Event;
use crate::modules::background::core::ports::{CommandProcessor, ProcessingError};
use crate::modules::background::use_cases::bridge_message::envelope::{
    InboundEnvelope, PendingReply,
};
use crate::shared::core::session_id::SessionId;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Decode(#[from] CodecError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("command processing timed out after {0} ms")]
    TimedOut(u128),
}

pub struct MessageBridge {
    session_id: SessionId,
    processor: Arc<dyn CommandProcessor>,
    process_timeout: Duration,
    placeholder: String,
}

impl MessageBridge {
    pub fn new(
        session_id: SessionId,
        processor: Arc<dyn CommandProcessor>,
        process_timeout: Duration,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            processor,
            process_timeout,
            placeholder: placeholder.into(),
        }
    }

    /// Runs the whole pipeline for one payload. Always yields an encoded event.
    pub async fn reply_for(&self, payload: &Value) -> String {
        let event = match self.dispatch(payload).await {
            Ok(event) => event,
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "command rejected");
                Event::rejected(err.to_string())
            }
        };
        encode_event(&event)
    }

    async fn dispatch(&self, payload: &Value) -> Result<Event, BridgeError> {
        let command = decode_command(payload)?;
        info!(session_id = %self.session_id, command = command.name(), "processing command");
        let processing = self.processor.process(self.session_id, command);
        match tokio::time::timeout(self.process_timeout, processing).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(BridgeError::TimedOut(self.process_timeout.as_millis())),
        }
    }

    /// Answers one envelope asynchronously. Returns `None` when the envelope carries no
    /// payload; its reply handle is dropped unanswered.
    pub fn on_message(
        self: &Arc<Self>,
        envelope: InboundEnvelope,
        runtime: &Handle,
    ) -> Option<PendingReply> {
        let InboundEnvelope {
            origin,
            payload,
            reply,
        } = envelope;
        let Some(payload) = payload else {
            debug!(origin = %origin, "ignoring message without payload");
            return None;
        };
        debug!(origin = %origin, "message received");
        let bridge = Arc::clone(self);
        let response = async move { bridge.reply_for(&payload).await };
        Some(reply.respond_with(runtime, response, &self.placeholder))
    }

    /// Answers envelopes until every sender of the inbox is gone.
    pub async fn listen(
        self: Arc<Self>,
        mut inbox: mpsc::Receiver<InboundEnvelope>,
        runtime: Handle,
    ) {
        info!(session_id = %self.session_id, "listening for extension messages");
        while let Some(envelope) = inbox.recv().await {
            self.on_message(envelope, &runtime);
        }
        info!(session_id = %self.session_id, "message channel closed");
    }
}

#[cfg(test)]
mod message_bridge_tests {
    use super::*;
    use crate::modules::background::core::commands::Command;
    use crate::modules::background::use_cases::bridge_message::envelope::ReplyHandle;
    use crate::tests::fixtures::{ScriptedProcessor, text_payload};
    use rstest::{fixture, rstest};

    const PLACEHOLDER: &str = "true";

    #[fixture]
    fn session_id() -> SessionId {
        SessionId::generate()
    }

    fn bridge_with(processor: Arc<ScriptedProcessor>, session_id: SessionId) -> Arc<MessageBridge> {
        Arc::new(MessageBridge::new(
            session_id,
            processor,
            Duration::from_millis(500),
            PLACEHOLDER,
        ))
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reply_pong_to_ping(session_id: SessionId) {
        let processor = Arc::new(ScriptedProcessor::replying(Event::Pong {}));
        let bridge = bridge_with(processor.clone(), session_id);
        let reply = bridge.reply_for(&text_payload(r#""PING""#)).await;
        assert_eq!(reply, r#"{"Pong":{}}"#);
        assert_eq!(processor.calls().await, vec![(session_id, Command::Ping)]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_payload_that_is_not_json(session_id: SessionId) {
        let processor = Arc::new(ScriptedProcessor::replying(Event::Pong {}));
        let bridge = bridge_with(processor.clone(), session_id);
        let reply = bridge.reply_for(&text_payload("not json")).await;
        let parse_error = serde_json::from_str::<Command>("not json")
            .unwrap_err()
            .to_string();
        assert_eq!(reply, encode_event(&Event::rejected(parse_error)));
        assert!(processor.calls().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_payload_that_is_not_a_string(session_id: SessionId) {
        let bridge = bridge_with(Arc::new(ScriptedProcessor::replying(Event::Pong {})), session_id);
        let reply = bridge.reply_for(&serde_json::json!(7)).await;
        assert_eq!(reply, encode_event(&Event::rejected("payload is not a string")));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_with_the_processing_error_message(session_id: SessionId) {
        let failure = ProcessingError::Backend("catalogue offline".into());
        let bridge = bridge_with(Arc::new(ScriptedProcessor::failing(failure.clone())), session_id);
        let reply = bridge.reply_for(&text_payload(r#""LIST_TRACKED_PRODUCTS""#)).await;
        assert_eq!(reply, encode_event(&Event::rejected(failure.to_string())));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_reject_when_processing_exceeds_the_deadline(session_id: SessionId) {
        let processor =
            ScriptedProcessor::replying(Event::Pong {}).with_delay(Duration::from_secs(5));
        let bridge = bridge_with(Arc::new(processor), session_id);
        let reply = bridge.reply_for(&text_payload(r#""PING""#)).await;
        assert_eq!(
            reply,
            encode_event(&Event::rejected("command processing timed out after 500 ms"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_answer_an_envelope_once_with_the_placeholder(session_id: SessionId) {
        let bridge = bridge_with(Arc::new(ScriptedProcessor::replying(Event::Pong {})), session_id);
        let (reply, receiver) = ReplyHandle::channel();
        let envelope = InboundEnvelope {
            origin: "popup".into(),
            payload: Some(text_payload(r#""PING""#)),
            reply,
        };
        let pending = bridge
            .on_message(envelope, &Handle::current())
            .expect("expected a pending reply");
        assert_eq!(pending.placeholder(), PLACEHOLDER);
        pending.delivered().await;
        assert_eq!(receiver.await.expect("no reply"), r#"{"Pong":{}}"#);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_answer_an_envelope_without_payload(session_id: SessionId) {
        let processor = Arc::new(ScriptedProcessor::replying(Event::Pong {}));
        let bridge = bridge_with(processor.clone(), session_id);
        let (reply, receiver) = ReplyHandle::channel();
        let envelope = InboundEnvelope {
            origin: "content-script".into(),
            payload: None,
            reply,
        };
        assert!(bridge.on_message(envelope, &Handle::current()).is_none());
        assert!(receiver.await.is_err());
        assert!(processor.calls().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_stop_listening_when_the_inbox_closes(session_id: SessionId) {
        let bridge = bridge_with(Arc::new(ScriptedProcessor::replying(Event::Pong {})), session_id);
        let (sender, inbox) = mpsc::channel(4);
        let listener = tokio::spawn(bridge.listen(inbox, Handle::current()));
        let (reply, receiver) = ReplyHandle::channel();
        sender
            .send(InboundEnvelope {
                origin: "popup".into(),
                payload: Some(text_payload(r#""PING""#)),
                reply,
            })
            .await
            .expect("send failed");
        assert_eq!(receiver.await.expect("no reply"), r#"{"Pong":{}}"#);
        drop(sender);
        listener.await.expect("listener panicked");
    }
}

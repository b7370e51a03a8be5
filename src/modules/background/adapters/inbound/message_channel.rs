// Inbound message channel between extension parts (popup, content scripts) and the
// background process.
//
// Responsibilities
// - Carry envelopes to the background listener over a bounded queue.
// - Give senders an await-the-reply API on top of the envelope's one-shot reply slot.

use crate::modules::background::use_cases::bridge_message::envelope::{
    InboundEnvelope, ReplyHandle,
};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessengerError {
    #[error("background listener is not running")]
    Disconnected,

    #[error("message was dropped without a reply")]
    NoReply,
}

pub fn message_channel(capacity: usize) -> (ExtensionMessenger, mpsc::Receiver<InboundEnvelope>) {
    let (sender, inbox) = mpsc::channel(capacity);
    (
        ExtensionMessenger {
            origin: "extension".to_string(),
            sender,
        },
        inbox,
    )
}

/// Sending side of the message channel. Cheap to clone, one per extension part.
#[derive(Debug, Clone)]
pub struct ExtensionMessenger {
    origin: String,
    sender: mpsc::Sender<InboundEnvelope>,
}

impl ExtensionMessenger {
    pub fn with_origin(&self, origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            sender: self.sender.clone(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub async fn send_message(&self, payload: Option<Value>) -> Result<String, MessengerError> {
        let (reply, response) = ReplyHandle::channel();
        self.sender
            .send(InboundEnvelope {
                origin: self.origin.clone(),
                payload,
                reply,
            })
            .await
            .map_err(|_| MessengerError::Disconnected)?;
        response.await.map_err(|_| MessengerError::NoReply)
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<String, MessengerError> {
        self.send_message(Some(Value::String(text.into()))).await
    }
}

#[cfg(test)]
mod extension_messenger_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_deliver_the_payload_and_await_the_reply() {
        let (messenger, mut inbox) = message_channel(1);
        let popup = messenger.with_origin("popup");
        let responder = tokio::spawn(async move {
            let envelope = inbox.recv().await.expect("no envelope");
            assert_eq!(envelope.origin, "popup");
            assert_eq!(envelope.payload, Some(Value::String("\"PING\"".into())));
            let _ = envelope.reply.respond_with(
                &tokio::runtime::Handle::current(),
                async { "pong".to_string() },
                "true",
            );
        });
        assert_eq!(popup.send_text("\"PING\"").await, Ok("pong".to_string()));
        responder.await.expect("responder panicked");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_when_the_listener_is_gone() {
        let (messenger, inbox) = message_channel(1);
        drop(inbox);
        assert_eq!(
            messenger.send_text("\"PING\"").await,
            Err(MessengerError::Disconnected)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_when_the_envelope_is_dropped_unanswered() {
        let (messenger, mut inbox) = message_channel(1);
        let listener = tokio::spawn(async move {
            let envelope = inbox.recv().await.expect("no envelope");
            drop(envelope);
        });
        assert_eq!(
            messenger.send_message(None).await,
            Err(MessengerError::NoReply)
        );
        listener.await.expect("listener panicked");
    }

    #[rstest]
    fn it_should_default_to_the_extension_origin() {
        let (messenger, _inbox) = message_channel(1);
        assert_eq!(messenger.origin(), "extension");
        assert_eq!(messenger.with_origin("options").origin(), "options");
    }
}

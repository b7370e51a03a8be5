use serde_json::Value;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// A message delivered by another part of the extension.
///
/// `payload` is opaque; only string payloads can be decoded into commands.
#[derive(Debug)]
pub struct InboundEnvelope {
    pub origin: String,
    pub payload: Option<Value>,
    pub reply: ReplyHandle,
}

/// The one-shot reply slot of an envelope.
///
/// Answering consumes the handle, so a message can be answered at most once. Dropping it
/// unanswered closes the sender's side of the channel.
#[derive(Debug)]
pub struct ReplyHandle {
    sender: oneshot::Sender<String>,
}

impl ReplyHandle {
    pub fn channel() -> (Self, oneshot::Receiver<String>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Registers an asynchronous reply.
    ///
    /// The response future runs on `runtime`; its output is delivered once it resolves.
    /// If it panics the panic is logged and the handle is dropped unanswered.
    /// The returned [`PendingReply`] carries the placeholder the host expects back
    /// synchronously to keep the sender waiting.
    pub fn respond_with<F>(self, runtime: &Handle, response: F, placeholder: &str) -> PendingReply
    where
        F: Future<Output = String> + Send + 'static,
    {
        let sender = self.sender;
        let response = runtime.spawn(response);
        let delivery = runtime.spawn(async move {
            let reply = match response.await {
                Ok(reply) => reply,
                Err(err) => {
                    error!(error = %err, "reply task failed, message left unanswered");
                    return;
                }
            };
            if sender.send(reply).is_err() {
                debug!("sender went away before the reply was delivered");
            }
        });
        PendingReply {
            placeholder: placeholder.to_string(),
            delivery,
        }
    }
}

#[derive(Debug)]
pub struct PendingReply {
    placeholder: String,
    delivery: JoinHandle<()>,
}

impl PendingReply {
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Resolves once the reply has been handed to the sender.
    pub async fn delivered(self) {
        if let Err(err) = self.delivery.await {
            error!(error = %err, "reply delivery was interrupted");
        }
    }
}

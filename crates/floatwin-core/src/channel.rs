//! Best-effort message channels between the host app and the overlay content.

use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Name of the channel the overlay content uses to control its own window.
pub const OVERLAY_CONTROL_CHANNEL: &str = "floatwin/overlay_control";
/// Name of the channel carrying application data.
pub const OVERLAY_MESSENGER_CHANNEL: &str = "floatwin/messenger";

/// One-way JSON channel with at most one listener.
///
/// Messages are never queued for a listener that does not exist yet: sending
/// without a live listener reports `false` and drops the payload.
#[derive(Debug)]
pub struct DataChannel {
    name: &'static str,
    listener: Option<UnboundedSender<Value>>,
}

impl DataChannel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listener: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start listening. Replaces any previous listener.
    pub fn listen(&mut self) -> UnboundedReceiver<Value> {
        let (tx, rx) = unbounded_channel();
        if self.listener.replace(tx).is_some() {
            debug!(channel = self.name, "Replaced data channel listener");
        }
        rx
    }

    pub fn cancel(&mut self) {
        self.listener = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listener.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn send(&mut self, payload: Value) -> bool {
        let Some(tx) = &self.listener else {
            trace!(channel = self.name, "No listener, dropping message");
            return false;
        };
        if tx.send(payload).is_err() {
            debug!(channel = self.name, "Listener went away, dropping message");
            self.listener = None;
            return false;
        }
        true
    }
}

/// Both directions of the application data exchange.
#[derive(Debug)]
pub struct MessageBridge {
    pub to_overlay: DataChannel,
    pub to_host: DataChannel,
}

impl Default for MessageBridge {
    fn default() -> Self {
        Self {
            to_overlay: DataChannel::new("to_overlay"),
            to_host: DataChannel::new("to_host"),
        }
    }
}

/// Request sent by the overlay content about its own window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Close,
}

impl ControlCommand {
    pub fn parse(method: &str) -> Result<Self> {
        match method {
            "close" => Ok(ControlCommand::Close),
            other => Err(Error::UnsupportedCommand(other.to_string())),
        }
    }
}

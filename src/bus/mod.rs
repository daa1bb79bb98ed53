// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message bus interface.
//!
//! The bridge talks to the bus through two capabilities:
//!
//! - [`Emitter`]: publishes readings and discovery documents.
//! - [`Listener`]: delivers inbound command messages to a
//!   [`MessageHandler`], one spawned task per message.
//!
//! [`MqttBus`] implements both on top of a single MQTT connection.
//!
//! # Architecture
//!
//! ```text
//! broker ──publish──► event loop ──mpsc──► dispatcher ──spawn──► handler.handle()
//!                                                                  (Router)
//! Scheduler ──emit──► MqttBus ──publish──► broker
//! ```

mod discovery;
#[cfg(feature = "mqtt")]
mod mqtt;
mod topic;

pub use discovery::{
    ClimateDiscovery, Component, EntityDiscovery, HaDevice, RoomDiscovery, slug,
};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBus, MqttConfig};
pub use topic::{CommandTopic, Direction, MessageKind, command_filter, topic};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ProtocolError, Result};

/// Default MQTT port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// The unit exchanged with the bus.
///
/// The topic is derived from the device name, the room, the direction and
/// the kind; see [`topic()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Room number, `0` for the whole device.
    pub room: u32,
    /// Addressed attribute.
    pub kind: MessageKind,
    /// UTF-8 payload.
    pub data: String,
}

impl BusMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(room: u32, kind: MessageKind, data: impl Into<String>) -> Self {
        Self {
            room,
            kind,
            data: data.into(),
        }
    }
}

/// A raw message received from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Full topic.
    pub topic: String,
    /// Raw payload.
    pub payload: Vec<u8>,
}

/// Publishes messages on the bus.
pub trait Emitter: Send + Sync {
    /// Publishes a `state` message for a device.
    ///
    /// # Errors
    ///
    /// Returns error if the bus is unreachable or rejects the message.
    fn emit(&self, device: &str, message: &BusMessage) -> impl Future<Output = Result<()>> + Send;

    /// Publishes a per-entity discovery document.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be encoded or published.
    fn emit_discovery(&self, entity: &EntityDiscovery)
    -> impl Future<Output = Result<()>> + Send;
}

/// Receives inbound bus messages.
///
/// Called once per message on its own task. Implementations log failures
/// themselves; nothing is reported back to the bus.
pub trait MessageHandler: Send + Sync + 'static {
    /// Handles one inbound message.
    fn handle(&self, topic: &str, payload: &[u8]) -> impl Future<Output = ()> + Send;
}

/// Subscribes to inbound command messages.
pub trait Listener: Send + Sync {
    /// Subscribes to every command topic and routes messages to `handler`.
    ///
    /// # Errors
    ///
    /// Returns error if the bus is unreachable or the subscription fails.
    fn connect<H: MessageHandler>(
        &self,
        handler: Arc<H>,
    ) -> impl Future<Output = Result<Subscription>> + Send;

    /// Stops receiving and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns error if the bus rejects the disconnect.
    fn disconnect(&self) -> impl Future<Output = Result<()>> + Send;
}

/// An active listener subscription.
///
/// Dropping the subscription stops dispatching; [`Subscription::disconnect`]
/// additionally waits for the dispatcher to finish.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawns a dispatcher that hands every message from `inbound` to
    /// `handler` on its own task.
    pub fn spawn<H: MessageHandler>(
        mut inbound: mpsc::Receiver<InboundMessage>,
        handler: Arc<H>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    message = inbound.recv() => {
                        let Some(message) = message else { break };
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            handler.handle(&message.topic, &message.payload).await;
                        });
                    }
                }
            }
            tracing::debug!("Bus dispatcher stopped");
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Stops dispatching and waits for the dispatcher to exit.
    pub async fn disconnect(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Bus dispatcher ended abnormally");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Parses a broker URL such as `mqtt://host:1883`, `tcp://host` or `host`.
///
/// # Errors
///
/// Returns `ProtocolError::InvalidAddress` if the host is missing or the port
/// is not a number.
pub fn parse_broker_url(url: &str) -> std::result::Result<(String, u16), ProtocolError> {
    let address = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url)
        .trim_end_matches('/');

    let (host, port) = if let Some((h, p)) = address.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("invalid port: {p}")))?;
        (h, port)
    } else {
        (address, DEFAULT_MQTT_PORT)
    };

    if host.is_empty() || host.contains('/') {
        return Err(ProtocolError::InvalidAddress(format!(
            "invalid broker url: {url}"
        )));
    }

    Ok((host.to_string(), port))
}

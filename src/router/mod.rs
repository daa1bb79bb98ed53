// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between bus messages and controller calls.
//!
//! Inbound, the [`Router`] turns a `set` topic and payload into a sparse
//! update and sends it to the addressed controller. Outbound, the functions
//! in this module format snapshots into `state` messages and discovery
//! documents.
//!
//! The router keeps no state of its own: every decision depends only on the
//! topic, the payload, the device registry and the identity store.

mod command;
mod outbound;

pub use command::Command;
pub use outbound::{climate_discovery, entity_discoveries, meta_message, state_messages};

use std::sync::Arc;

use crate::bus::{CommandTopic, MessageHandler};
use crate::error::{Error, Result};
use crate::manager::DeviceRegistry;
use crate::store::IdentityStore;
use crate::transport::DeviceTransport;

/// Routes inbound commands to controller transports.
pub struct Router<T> {
    prefix: String,
    registry: Arc<DeviceRegistry<T>>,
    store: Arc<dyn IdentityStore>,
}

impl<T> std::fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("devices", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<T: DeviceTransport> Router<T> {
    /// Creates a router for topics under `prefix`.
    #[must_use]
    pub fn new(
        prefix: impl Into<String>,
        registry: Arc<DeviceRegistry<T>>,
        store: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            registry,
            store,
        }
    }

    /// Returns the topic prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Dispatches one `set` message.
    ///
    /// The update is sent while holding the device lock, so it never
    /// interleaves with a poll of the same device.
    ///
    /// # Errors
    ///
    /// - `Error::Message` if the topic or payload is malformed
    /// - `Error::UnknownDevice` if no transport is registered under the name
    /// - `Error::DeviceNotDiscovered` if the controller identifier is not
    ///   known yet
    /// - any transport error from sending the update
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> Result<Command> {
        let target = CommandTopic::parse(&self.prefix, topic)?;
        let command = Command::parse(target.kind, target.room, payload)?;

        let device = self
            .registry
            .get(target.device)
            .ok_or_else(|| Error::UnknownDevice(target.device.to_string()))?;

        let id = self
            .store
            .get_id(target.device)
            .ok_or_else(|| Error::DeviceNotDiscovered(target.device.to_string()))?;

        let update = command.to_update(&id);
        let transport = device.lock().await;
        transport.send_update(&update).await?;

        tracing::info!(device = %target.device, command = %command, "Command sent");
        Ok(command)
    }
}

impl<T> MessageHandler for Router<T>
where
    T: DeviceTransport + 'static,
{
    async fn handle(&self, topic: &str, payload: &[u8]) {
        match self.dispatch(topic, payload).await {
            Ok(_) => {}
            Err(Error::Message(e)) => {
                tracing::warn!(topic = %topic, error = %e, "Dropping malformed message");
            }
            Err(e @ (Error::UnknownDevice(_) | Error::DeviceNotDiscovered(_))) => {
                tracing::warn!(topic = %topic, error = %e, "Dropping message for unavailable device");
            }
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "Failed to handle message");
            }
        }
    }
}

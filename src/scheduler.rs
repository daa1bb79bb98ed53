// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic polling and emission.
//!
//! Every managed device gets two independent tasks:
//!
//! - **announce**: fetches one snapshot on start, records the controller
//!   identifier and emits the discovery documents.
//! - **poll**: every `poll_every`, fetches a snapshot and emits the readings
//!   of every room. The first poll happens one interval after start.
//!
//! A failed fetch is logged and the cycle skipped; the next tick proceeds
//! normally. Cancellation interrupts a cycle in flight. If the announcement failed, the next successful poll announces
//! from its own snapshot.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ezr2mqtt::bus::{MqttBus, MqttConfig};
//! use ezr2mqtt::manager::DeviceRegistry;
//! use ezr2mqtt::scheduler::{ScheduleConfig, Scheduler};
//! use ezr2mqtt::store::InMemoryStore;
//! use ezr2mqtt::transport::MockTransport;
//!
//! # async fn example() {
//! let mut registry = DeviceRegistry::new();
//! registry.register("ezr-mock", MockTransport::new());
//!
//! let scheduler = Scheduler::start(
//!     &registry,
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(MqttBus::new(MqttConfig::default())),
//!     ScheduleConfig::new(Duration::from_secs(60)),
//! );
//!
//! // ...
//! scheduler.shutdown().await;
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bus::Emitter;
use crate::error::Result;
use crate::manager::{DeviceRegistry, ManagedDevice};
use crate::model::{Device, DeviceMessage};
use crate::router::{entity_discoveries, meta_message, state_messages};
use crate::store::IdentityStore;
use crate::transport::DeviceTransport;

/// Default interval between two polls of a device.
pub const DEFAULT_POLL_EVERY: Duration = Duration::from_secs(60);

/// Settings shared by every poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    poll_every: Duration,
    prefix: String,
    entity_discovery: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_EVERY)
    }
}

impl ScheduleConfig {
    /// Creates settings polling every `poll_every` under the `ezr` prefix,
    /// without per-entity discovery.
    #[must_use]
    pub fn new(poll_every: Duration) -> Self {
        Self {
            poll_every,
            prefix: "ezr".to_string(),
            entity_discovery: false,
        }
    }

    /// Sets the topic prefix used in discovery documents.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enables per-entity discovery.
    ///
    /// The discovery topic prefix belongs to the emitter, see
    /// [`MqttConfig::with_discovery_prefix`](crate::bus::MqttConfig::with_discovery_prefix).
    #[must_use]
    pub fn with_entity_discovery(mut self) -> Self {
        self.entity_discovery = true;
        self
    }

    /// Returns the interval between two polls.
    #[must_use]
    pub fn poll_every(&self) -> Duration {
        self.poll_every
    }

    /// Returns the topic prefix used in discovery documents.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `true` when per-entity discovery documents are emitted.
    #[must_use]
    pub fn entity_discovery(&self) -> bool {
        self.entity_discovery
    }
}

/// Polls one device and emits what it finds.
pub struct Poller<T, E> {
    device: Arc<ManagedDevice<T>>,
    store: Arc<dyn IdentityStore>,
    emitter: Arc<E>,
    config: Arc<ScheduleConfig>,
    announced: Arc<AtomicBool>,
}

impl<T, E> Clone for Poller<T, E> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            store: Arc::clone(&self.store),
            emitter: Arc::clone(&self.emitter),
            config: Arc::clone(&self.config),
            announced: Arc::clone(&self.announced),
        }
    }
}

impl<T, E> Poller<T, E>
where
    T: DeviceTransport + 'static,
    E: Emitter + 'static,
{
    /// Creates a poller for `device`.
    #[must_use]
    pub fn new(
        device: Arc<ManagedDevice<T>>,
        store: Arc<dyn IdentityStore>,
        emitter: Arc<E>,
        config: Arc<ScheduleConfig>,
    ) -> Self {
        Self {
            device,
            store,
            emitter,
            config,
            announced: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the name of the polled device.
    #[must_use]
    pub fn name(&self) -> &str {
        self.device.name()
    }

    /// Fetches a snapshot and emits its discovery documents.
    ///
    /// Returns the number of documents emitted.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be fetched.
    pub async fn announce(&self) -> Result<usize> {
        let snapshot = self.fetch().await?;
        self.record_identity(&snapshot.device);
        Ok(self.emit_discovery(&snapshot.device).await)
    }

    /// Fetches a snapshot and emits the readings of every room.
    ///
    /// Returns the number of readings emitted.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be fetched.
    pub async fn poll(&self) -> Result<usize> {
        let snapshot = self.fetch().await?;
        self.record_identity(&snapshot.device);

        if !self.announced.load(Ordering::Acquire) {
            self.emit_discovery(&snapshot.device).await;
        }

        let mut emitted = 0;
        for message in state_messages(&snapshot.device) {
            match self.emitter.emit(self.name(), &message).await {
                Ok(()) => emitted += 1,
                Err(e) => tracing::error!(
                    device = %self.name(),
                    room = message.room,
                    kind = %message.kind,
                    error = %e,
                    "Failed to emit reading"
                ),
            }
        }

        tracing::debug!(device = %self.name(), emitted, "Poll cycle complete");
        Ok(emitted)
    }

    /// Fetches a snapshot. The device lock is released before anything is
    /// emitted.
    async fn fetch(&self) -> Result<DeviceMessage> {
        let transport = self.device.lock().await;
        transport.fetch_snapshot().await
    }

    fn record_identity(&self, device: &Device) {
        match device.id.as_deref() {
            Some(id) if !id.is_empty() => self.store.set_id(self.name(), id),
            _ => tracing::warn!(device = %self.name(), "Snapshot carries no controller id"),
        }
    }

    async fn emit_discovery(&self, device: &Device) -> usize {
        let mut emitted = 0;

        match meta_message(device) {
            Ok(meta) => match self.emitter.emit(self.name(), &meta).await {
                Ok(()) => emitted += 1,
                Err(e) => tracing::error!(device = %self.name(), error = %e, "Failed to emit meta"),
            },
            Err(e) => tracing::error!(device = %self.name(), error = %e, "Failed to encode meta"),
        }

        if self.config.entity_discovery() {
            for entity in entity_discoveries(self.config.prefix(), self.name(), device) {
                match self.emitter.emit_discovery(&entity).await {
                    Ok(()) => emitted += 1,
                    Err(e) => tracing::error!(
                        device = %self.name(),
                        entity = %entity.unique_id,
                        error = %e,
                        "Failed to emit discovery"
                    ),
                }
            }
        }

        self.announced.store(true, Ordering::Release);
        tracing::info!(device = %self.name(), emitted, "Device announced");
        emitted
    }

    /// Spawns the announce and poll tasks.
    fn spawn(self, cancel: &CancellationToken) -> [JoinHandle<()>; 2] {
        let announce = tokio::spawn(announce_task(self.clone(), cancel.clone()));
        let poll = tokio::spawn(poll_task(self, cancel.clone()));
        [announce, poll]
    }
}

async fn announce_task<T, E>(poller: Poller<T, E>, cancel: CancellationToken)
where
    T: DeviceTransport + 'static,
    E: Emitter + 'static,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {}
        result = poller.announce() => {
            if let Err(e) = result {
                tracing::warn!(device = %poller.name(), error = %e, "Announcement failed");
            }
        }
    }
}

async fn poll_task<T, E>(poller: Poller<T, E>, cancel: CancellationToken)
where
    T: DeviceTransport + 'static,
    E: Emitter + 'static,
{
    let mut interval = tokio::time::interval(poller.config.poll_every());
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = poller.poll() => {
                        if let Err(e) = result {
                            tracing::warn!(device = %poller.name(), error = %e, "Poll failed, skipping cycle");
                        }
                    }
                }
            }
        }
    }
    tracing::debug!(device = %poller.name(), "Poller stopped");
}

/// Runs the pollers of every registered device.
///
/// Dropping the scheduler cancels its tasks without waiting for them;
/// [`Scheduler::shutdown`] also waits.
#[derive(Debug)]
pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Starts one announce and one poll task per device of `registry`.
    #[must_use]
    pub fn start<T, E>(
        registry: &DeviceRegistry<T>,
        store: Arc<dyn IdentityStore>,
        emitter: Arc<E>,
        config: ScheduleConfig,
    ) -> Self
    where
        T: DeviceTransport + 'static,
        E: Emitter + 'static,
    {
        let cancel = CancellationToken::new();
        let config = Arc::new(config);
        let mut handles = Vec::with_capacity(registry.len() * 2);

        for device in registry.iter() {
            let poller = Poller::new(
                Arc::clone(device),
                Arc::clone(&store),
                Arc::clone(&emitter),
                Arc::clone(&config),
            );
            tracing::info!(
                device = %poller.name(),
                every = %humantime::format_duration(config.poll_every()),
                "Starting poller"
            );
            handles.extend(poller.spawn(&cancel));
        }

        Self { cancel, handles }
    }

    /// Returns `true` while at least one task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|handle| !handle.is_finished())
    }

    /// Cancels every task and waits for them to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Scheduler task ended abnormally");
            }
        }
        tracing::info!("Scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

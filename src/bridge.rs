// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level wiring.
//!
//! A [`Bridge`] owns the device registry, the identity store and the bus.
//! Starting it subscribes the [`Router`] to command topics and launches the
//! [`Scheduler`]; shutting it down stops both and disconnects the bus.
//!
//! # Examples
//!
//! ```no_run
//! use ezr2mqtt::Bridge;
//! use ezr2mqtt::config::Config;
//!
//! # async fn example() -> ezr2mqtt::Result<()> {
//! let config = Config::load("/config/config.yaml")?;
//! let mut bridge = Bridge::from_config(&config)?;
//!
//! bridge.start().await?;
//! tokio::signal::ctrl_c().await.ok();
//! bridge.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

#[cfg(all(feature = "http", feature = "mqtt"))]
use crate::bus::MqttBus;
use crate::bus::{Emitter, Listener, Subscription};
#[cfg(all(feature = "http", feature = "mqtt"))]
use crate::config::{Config, TransportKind};
#[cfg(all(feature = "http", feature = "mqtt"))]
use crate::error::ConfigError;
use crate::error::Result;
use crate::manager::DeviceRegistry;
use crate::router::Router;
use crate::scheduler::{ScheduleConfig, Scheduler};
use crate::store::{IdentityStore, InMemoryStore};
use crate::transport::DeviceTransport;
#[cfg(all(feature = "http", feature = "mqtt"))]
use crate::transport::{DeviceClient, MockTransport};

struct Running {
    scheduler: Scheduler,
    subscription: Subscription,
}

/// Connects a set of controllers to a message bus.
pub struct Bridge<T, B> {
    registry: Arc<DeviceRegistry<T>>,
    store: Arc<InMemoryStore>,
    bus: Arc<B>,
    schedule: ScheduleConfig,
    running: Option<Running>,
}

impl<T, B> std::fmt::Debug for Bridge<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("devices", &self.registry.len())
            .field("schedule", &self.schedule)
            .field("running", &self.running.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(all(feature = "http", feature = "mqtt"))]
impl Bridge<DeviceClient, MqttBus> {
    /// Builds a bridge from a configuration.
    ///
    /// The configuration is validated first. Nothing is connected until
    /// [`Bridge::start`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid, or
    /// `Error::Protocol` if an HTTP transport cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut registry = DeviceRegistry::new();
        for device in &config.ezr {
            let client = match device.kind {
                TransportKind::Mock => DeviceClient::from(MockTransport::new()),
                TransportKind::Http => {
                    let http = device.http.as_ref().ok_or_else(|| {
                        ConfigError::validation("ezr.http.host", format!("required for http device {}", device.name))
                    })?;
                    DeviceClient::from(http.to_http_config()?.into_transport()?)
                }
            };
            registry.register(&device.name, client);
        }

        let bus = MqttBus::new(config.api.mqtt.to_mqtt_config()?);
        Ok(Self::new(registry, bus, config.schedule_config()?))
    }
}

impl<T, B> Bridge<T, B>
where
    T: DeviceTransport + 'static,
    B: Emitter + Listener + 'static,
{
    /// Creates a stopped bridge.
    #[must_use]
    pub fn new(registry: DeviceRegistry<T>, bus: B, schedule: ScheduleConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            store: Arc::new(InMemoryStore::new()),
            bus: Arc::new(bus),
            schedule,
            running: None,
        }
    }

    /// Returns the registered devices.
    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry<T>> {
        &self.registry
    }

    /// Returns the identity store filled by the pollers.
    #[must_use]
    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    /// Returns the bus the bridge publishes on and listens to.
    #[must_use]
    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    /// Returns `true` between [`Bridge::start`] and [`Bridge::shutdown`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Subscribes to command topics and starts polling.
    ///
    /// Calling `start` on a running bridge does nothing.
    ///
    /// # Errors
    ///
    /// Returns error if the bus subscription fails. Polling is not started
    /// in that case.
    pub async fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            tracing::warn!("Bridge already running");
            return Ok(());
        }

        let store: Arc<dyn IdentityStore> = self.store.clone();
        let router = Router::new(self.schedule.prefix(), Arc::clone(&self.registry), Arc::clone(&store));
        let subscription = self.bus.connect(Arc::new(router)).await?;

        let scheduler = Scheduler::start(
            &self.registry,
            store,
            Arc::clone(&self.bus),
            self.schedule.clone(),
        );

        tracing::info!(devices = self.registry.len(), "Bridge started");
        self.running = Some(Running {
            scheduler,
            subscription,
        });
        Ok(())
    }

    /// Stops polling and command handling, then disconnects the bus.
    ///
    /// # Errors
    ///
    /// Returns error if the bus disconnect fails. Polling and command
    /// handling are stopped regardless.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(running) = self.running.take() {
            running.scheduler.shutdown().await;
            running.subscription.disconnect().await;
        }
        self.bus.disconnect().await?;
        tracing::info!("Bridge stopped");
        Ok(())
    }
}

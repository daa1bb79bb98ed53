// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT bus adapter.
//!
//! [`MqttBus`] holds one broker connection per process. The connection is
//! established lazily by the first publish or subscribe; concurrent first
//! use performs a single connect while the other callers wait for it.
//!
//! # Examples
//!
//! ```no_run
//! use ezr2mqtt::bus::{BusMessage, Emitter, Listener, MessageKind, MqttBus, MqttConfig};
//!
//! # async fn example() -> ezr2mqtt::Result<()> {
//! let bus = MqttBus::new(
//!     MqttConfig::new(vec!["mqtt://192.168.1.50:1883".to_string()])
//!         .with_credentials("user", "password"),
//! );
//!
//! bus.emit("floor1", &BusMessage::new(1, MessageKind::TemperatureActual, "21.50"))
//!     .await?;
//!
//! bus.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::sync::{OnceCell, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::bus::{
    BusMessage, Direction, Emitter, EntityDiscovery, InboundMessage, Listener, MessageHandler,
    Subscription, command_filter, parse_broker_url, topic,
};
use crate::error::{ParseError, ProtocolError, Result};

/// Capacity of the request and inbound channels.
const CHANNEL_CAPACITY: usize = 64;

/// Configuration for the MQTT bus.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::bus::MqttConfig;
/// use std::time::Duration;
///
/// let config = MqttConfig::new(vec!["mqtt://broker:1883".to_string()])
///     .with_prefix("heating")
///     .with_keep_alive(Duration::from_secs(30));
///
/// assert_eq!(config.prefix(), "heating");
/// assert_eq!(config.group(), "ezr2mqtt");
/// ```
#[derive(Debug, Clone)]
pub struct MqttConfig {
    urls: Vec<String>,
    prefix: String,
    group: String,
    credentials: Option<(String, String)>,
    connect_timeout: Duration,
    connect_retry_delay: Duration,
    keep_alive: Duration,
    discovery_prefix: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            urls: vec![Self::DEFAULT_URL.to_string()],
            prefix: Self::DEFAULT_PREFIX.to_string(),
            group: Self::DEFAULT_GROUP.to_string(),
            credentials: None,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            connect_retry_delay: Self::DEFAULT_RETRY_DELAY,
            keep_alive: Self::DEFAULT_KEEP_ALIVE,
            discovery_prefix: Self::DEFAULT_DISCOVERY_PREFIX.to_string(),
        }
    }
}

impl MqttConfig {
    /// Default broker URL.
    pub const DEFAULT_URL: &'static str = "mqtt://mqtt:1883";
    /// Default topic prefix.
    pub const DEFAULT_PREFIX: &'static str = "ezr";
    /// Default client-id prefix.
    pub const DEFAULT_GROUP: &'static str = "ezr2mqtt";
    /// Default time allowed for one connection attempt.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default pause between reconnection attempts.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
    /// Default keep-alive interval.
    pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);
    /// Default Home Assistant discovery prefix.
    pub const DEFAULT_DISCOVERY_PREFIX: &'static str = "homeassistant";

    /// Creates a configuration for the given broker URLs, tried in order.
    #[must_use]
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Self::default()
        }
    }

    /// Sets the topic prefix (default: `ezr`).
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the client-id prefix (default: `ezr2mqtt`).
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the delay between reconnection attempts (default: 1 second).
    #[must_use]
    pub fn with_connect_retry_delay(mut self, delay: Duration) -> Self {
        self.connect_retry_delay = delay;
        self
    }

    /// Sets the keep-alive interval (default: 60 seconds).
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the Home Assistant discovery prefix (default: `homeassistant`).
    #[must_use]
    pub fn with_discovery_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discovery_prefix = prefix.into();
        self
    }

    /// Returns the broker URLs.
    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Returns the topic prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the client-id prefix.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns whether authentication is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the delay between reconnection attempts.
    #[must_use]
    pub fn connect_retry_delay(&self) -> Duration {
        self.connect_retry_delay
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the Home Assistant discovery prefix.
    #[must_use]
    pub fn discovery_prefix(&self) -> &str {
        &self.discovery_prefix
    }

    fn client_id(&self) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.group, &suffix[..5])
    }

    fn options(&self, url: &str) -> std::result::Result<MqttOptions, ProtocolError> {
        let (host, port) = parse_broker_url(url)?;
        let mut options = MqttOptions::new(self.client_id(), host, port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        if let Some((ref username, ref password)) = self.credentials {
            options.set_credentials(username, password);
        }
        Ok(options)
    }
}

/// Inbound routing state shared with the event loop task.
#[derive(Debug, Default)]
struct Routes {
    /// Destination of inbound publishes, set by the listener.
    inbound: RwLock<Option<mpsc::Sender<InboundMessage>>>,
    /// Filter to restore after a reconnect.
    filter: RwLock<Option<String>>,
}

/// MQTT implementation of [`Emitter`] and [`Listener`].
///
/// `MqttBus` is cheaply cloneable; clones share the connection.
#[derive(Clone)]
pub struct MqttBus {
    inner: Arc<MqttBusInner>,
}

struct MqttBusInner {
    config: MqttConfig,
    client: OnceCell<AsyncClient>,
    routes: Arc<Routes>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl MqttBus {
    /// Creates a bus. No connection is made until first use.
    #[must_use]
    pub fn new(config: MqttConfig) -> Self {
        Self {
            inner: Arc::new(MqttBusInner {
                config,
                client: OnceCell::new(),
                routes: Arc::new(Routes::default()),
                connected: Arc::new(AtomicBool::new(false)),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MqttConfig {
        &self.inner.config
    }

    /// Returns whether the broker connection is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the client, connecting on first use.
    async fn client(&self) -> std::result::Result<&AsyncClient, ProtocolError> {
        self.inner
            .client
            .get_or_try_init(|| self.establish())
            .await
    }

    /// Tries every configured broker in order until one accepts.
    async fn establish(&self) -> std::result::Result<AsyncClient, ProtocolError> {
        let config = &self.inner.config;
        let mut last_error =
            ProtocolError::ConnectionFailed("no MQTT broker configured".to_string());

        for url in config.urls() {
            match self.connect_to(url).await {
                Ok(client) => return Ok(client),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "MQTT broker unavailable");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn connect_to(&self, url: &str) -> std::result::Result<AsyncClient, ProtocolError> {
        let config = &self.inner.config;
        let options = config.options(url)?;
        let (client, event_loop) = AsyncClient::new(options, CHANNEL_CAPACITY);

        let (connack_tx, connack_rx) = oneshot::channel();
        let task = tokio::spawn(handle_bus_events(
            event_loop,
            client.clone(),
            EventLoopContext {
                routes: Arc::clone(&self.inner.routes),
                connected: Arc::clone(&self.inner.connected),
                retry_delay: config.connect_retry_delay(),
                shutdown: self.inner.shutdown.clone(),
            },
            connack_tx,
        ));

        let timeout = config.connect_timeout();
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(url = %url, "Connected to MQTT broker");
                Ok(client)
            }
            Ok(Err(_)) => {
                task.abort();
                Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection to {url} failed"
                )))
            }
            Err(_) => {
                task.abort();
                Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection to {url} timed out after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }

    async fn publish(&self, topic: String, payload: String, retain: bool) -> Result<()> {
        let client = self.client().await?;
        tracing::debug!(topic = %topic, payload = %payload, retain, "Publishing MQTT message");
        let timeout = self.inner.config.connect_timeout();
        let publish = client.publish(topic, QoS::AtLeastOnce, retain, payload.into_bytes());
        match tokio::time::timeout(timeout, publish).await {
            Ok(result) => result.map_err(ProtocolError::Mqtt)?,
            Err(_) => {
                let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                return Err(ProtocolError::Timeout(millis).into());
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MqttBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBus")
            .field("urls", &self.inner.config.urls)
            .field("prefix", &self.inner.config.prefix)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Emitter for MqttBus {
    async fn emit(&self, device: &str, message: &BusMessage) -> Result<()> {
        let topic = topic(
            self.inner.config.prefix(),
            device,
            message.room,
            Direction::State,
            message.kind.as_str(),
        );
        self.publish(topic, message.data.clone(), false).await
    }

    async fn emit_discovery(&self, entity: &EntityDiscovery) -> Result<()> {
        let topic = entity.config_topic(self.inner.config.discovery_prefix());
        let payload = serde_json::to_string(entity).map_err(ParseError::Json)?;
        self.publish(topic, payload, true).await
    }
}

impl Listener for MqttBus {
    async fn connect<H: MessageHandler>(&self, handler: Arc<H>) -> Result<Subscription> {
        let client = self.client().await?;
        let filter = command_filter(self.inner.config.prefix());

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        *self.inner.routes.inbound.write() = Some(tx);
        *self.inner.routes.filter.write() = Some(filter.clone());

        client
            .subscribe(filter.as_str(), QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)?;
        tracing::info!(filter = %filter, "Listening for commands");

        Ok(Subscription::spawn(rx, handler))
    }

    async fn disconnect(&self) -> Result<()> {
        *self.inner.routes.inbound.write() = None;
        *self.inner.routes.filter.write() = None;

        if let Some(client) = self.inner.client.get() {
            tracing::info!("Disconnecting from MQTT broker");
            self.inner.shutdown.cancel();
            let result = client.disconnect().await.map_err(ProtocolError::Mqtt);
            self.inner.connected.store(false, Ordering::Release);
            result?;
        }
        Ok(())
    }
}

struct EventLoopContext {
    routes: Arc<Routes>,
    connected: Arc<AtomicBool>,
    retry_delay: Duration,
    shutdown: CancellationToken,
}

/// Drives the MQTT event loop.
///
/// Before the first `ConnAck` any error ends the task and fails the connect.
/// Afterwards errors are logged and polling resumes after the retry delay,
/// which lets `rumqttc` reconnect. The task ends once a disconnect has been
/// sent, or on the next error after shutdown was requested.
async fn handle_bus_events(
    mut event_loop: EventLoop,
    client: AsyncClient,
    ctx: EventLoopContext,
    connack_tx: oneshot::Sender<()>,
) {
    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                ctx.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                } else {
                    resubscribe(&client, &ctx.routes);
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::debug!(topic = %publish.topic, "MQTT message received");
                let inbound = ctx.routes.inbound.read().clone();
                if let Some(inbound) = inbound {
                    let message = InboundMessage {
                        topic: publish.topic.clone(),
                        payload: publish.payload.to_vec(),
                    };
                    if inbound.send(message).await.is_err() {
                        tracing::debug!("Listener gone, dropping message");
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                ctx.connected.store(false, Ordering::Release);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                ctx.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                ctx.connected.store(false, Ordering::Release);
                if connack_tx.is_some() || ctx.shutdown.is_cancelled() {
                    tracing::error!(error = %e, "MQTT connection failed");
                    break;
                }
                tracing::warn!(error = %e, "MQTT connection lost, retrying");
                tokio::select! {
                    () = ctx.shutdown.cancelled() => break,
                    () = tokio::time::sleep(ctx.retry_delay) => {}
                }
            }
        }
    }
    tracing::debug!("MQTT event loop stopped");
}

fn resubscribe(client: &AsyncClient, routes: &Routes) {
    let filter = routes.filter.read().clone();
    if let Some(filter) = filter {
        match client.try_subscribe(filter.as_str(), QoS::AtLeastOnce) {
            Ok(()) => tracing::info!(filter = %filter, "Restored command subscription"),
            Err(e) => tracing::error!(filter = %filter, error = %e, "Failed to restore subscription"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.urls(), ["mqtt://mqtt:1883"]);
        assert_eq!(config.prefix(), "ezr");
        assert_eq!(config.group(), "ezr2mqtt");
        assert!(!config.has_credentials());
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.connect_retry_delay(), Duration::from_secs(1));
        assert_eq!(config.keep_alive(), Duration::from_secs(60));
        assert_eq!(config.discovery_prefix(), "homeassistant");
    }

    #[test]
    fn config_chain() {
        let config = MqttConfig::new(vec!["mqtt://a:1883".to_string(), "mqtt://b".to_string()])
            .with_prefix("heating")
            .with_group("bridge")
            .with_credentials("admin", "secret")
            .with_connect_timeout(Duration::from_secs(3))
            .with_connect_retry_delay(Duration::from_millis(250))
            .with_keep_alive(Duration::from_secs(15))
            .with_discovery_prefix("ha");

        assert_eq!(config.urls().len(), 2);
        assert_eq!(config.prefix(), "heating");
        assert_eq!(config.group(), "bridge");
        assert!(config.has_credentials());
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.connect_retry_delay(), Duration::from_millis(250));
        assert_eq!(config.keep_alive(), Duration::from_secs(15));
        assert_eq!(config.discovery_prefix(), "ha");
    }

    #[test]
    fn client_id_uses_group() {
        let config = MqttConfig::default().with_group("bridge");
        let id = config.client_id();
        assert!(id.starts_with("bridge-"));
        assert_eq!(id.len(), "bridge-".len() + 5);
        assert_ne!(config.client_id(), id);
    }

    #[test]
    fn options_reject_bad_url() {
        let config = MqttConfig::default();
        assert!(matches!(
            config.options("mqtt://host:port"),
            Err(ProtocolError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn disconnect_without_connection_is_noop() {
        let bus = MqttBus::new(MqttConfig::default());
        assert!(!bus.is_connected());
        assert!(bus.disconnect().await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_broker_fails_emit() {
        let bus = MqttBus::new(
            MqttConfig::new(vec!["mqtt://127.0.0.1:1".to_string()])
                .with_connect_timeout(Duration::from_millis(500)),
        );
        let result = bus
            .emit("dev1", &BusMessage::new(1, crate::bus::MessageKind::Meta, "{}"))
            .await;
        assert!(result.is_err());
        assert!(!bus.is_connected());
    }
}

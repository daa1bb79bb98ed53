// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. the YAML file (silently skipped when missing)
//! 3. environment variables prefixed `EZR2MQTT_`, nested keys split on `__`
//!    (`EZR2MQTT_API__MQTT__PREFIX=heating`)
//!
//! Durations are human-readable strings such as `10s` or `1m`.
//!
//! ```yaml
//! api:
//!   mqtt:
//!     urls: ["mqtt://mqtt:1883"]
//!     prefix: ezr
//!     group: ezr2mqtt
//!     connect_timeout: 10s
//!     connect_retry_delay: 1s
//!     keep_alive_interval: 60s
//!     home_assistant:
//!       enabled: false
//!       discovery_prefix: homeassistant
//! ezr:
//!   - name: ezr-mock
//!     type: mock
//!   - name: floor1
//!     type: http
//!     http:
//!       host: 192.168.1.50
//!       timeout: 10s
//! general:
//!   poll_every: 1m
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "mqtt")]
use crate::bus::MqttConfig;
use crate::bus::parse_broker_url;
use crate::error::ConfigError;
use crate::scheduler::ScheduleConfig;
#[cfg(feature = "http")]
use crate::transport::HttpConfig;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "EZR2MQTT_";

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "/config/config.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bus settings.
    pub api: ApiSettings,
    /// Managed controllers.
    pub ezr: Vec<EzrSettings>,
    /// Scheduling settings.
    pub general: GeneralSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            ezr: vec![EzrSettings {
                name: "ezr-mock".to_string(),
                kind: TransportKind::Mock,
                http: None,
            }],
            general: GeneralSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub mqtt: MqttSettings,
}

/// MQTT bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    /// Broker URLs, tried in order on first connect.
    pub urls: Vec<String>,
    /// Topic prefix.
    pub prefix: String,
    /// Client-id prefix.
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub connect_timeout: String,
    pub connect_retry_delay: String,
    pub keep_alive_interval: String,
    pub home_assistant: HomeAssistantSettings,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            urls: vec!["mqtt://mqtt:1883".to_string()],
            prefix: "ezr".to_string(),
            group: "ezr2mqtt".to_string(),
            username: None,
            password: None,
            connect_timeout: "10s".to_string(),
            connect_retry_delay: "1s".to_string(),
            keep_alive_interval: "60s".to_string(),
            home_assistant: HomeAssistantSettings::default(),
        }
    }
}

/// Per-entity discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantSettings {
    pub enabled: bool,
    pub discovery_prefix: String,
}

impl Default for HomeAssistantSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            discovery_prefix: "homeassistant".to_string(),
        }
    }
}

/// Kind of controller transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// In-memory controller.
    Mock,
    /// HTTP/XML controller.
    Http,
}

/// One managed controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EzrSettings {
    /// Logical device name, used in topics.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransportKind,
    /// Required for `http` controllers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Interval between two polls of a controller.
    pub poll_every: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            poll_every: "1m".to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration from defaults, `path` and the environment.
    ///
    /// A missing file is not an error; the defaults then apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source cannot be read or does not
    /// match the expected shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Parses a YAML document layered over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the document does not match the
    /// expected shape.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::string(yaml));

        Ok(figment.extract()?)
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mqtt = &self.api.mqtt;

        if mqtt.urls.is_empty() {
            return Err(ConfigError::validation("api.mqtt.urls", "at least one broker url is required"));
        }
        for url in &mqtt.urls {
            parse_broker_url(url)
                .map_err(|e| ConfigError::validation("api.mqtt.urls", e.to_string()))?;
        }
        if mqtt.prefix.is_empty() {
            return Err(ConfigError::validation("api.mqtt.prefix", "must not be empty"));
        }
        if mqtt.group.is_empty() {
            return Err(ConfigError::validation("api.mqtt.group", "must not be empty"));
        }
        if mqtt.username.is_some() != mqtt.password.is_some() {
            return Err(ConfigError::validation(
                "api.mqtt.username",
                "username and password must be set together",
            ));
        }
        parse_duration("api.mqtt.connect_timeout", &mqtt.connect_timeout)?;
        parse_duration("api.mqtt.connect_retry_delay", &mqtt.connect_retry_delay)?;
        parse_duration("api.mqtt.keep_alive_interval", &mqtt.keep_alive_interval)?;
        if mqtt.home_assistant.enabled && mqtt.home_assistant.discovery_prefix.is_empty() {
            return Err(ConfigError::validation(
                "api.mqtt.home_assistant.discovery_prefix",
                "must not be empty",
            ));
        }

        if self.poll_every()?.is_zero() {
            return Err(ConfigError::validation("general.poll_every", "must be greater than zero"));
        }

        if self.ezr.is_empty() {
            return Err(ConfigError::validation("ezr", "at least one device is required"));
        }
        let mut names = HashSet::new();
        for device in &self.ezr {
            device.validate()?;
            if !names.insert(device.name.as_str()) {
                return Err(ConfigError::validation(
                    "ezr.name",
                    format!("duplicate device name {}", device.name),
                ));
            }
        }

        Ok(())
    }

    /// Returns the poll interval.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the interval cannot be parsed.
    pub fn poll_every(&self) -> Result<Duration, ConfigError> {
        parse_duration("general.poll_every", &self.general.poll_every)
    }

    /// Builds the scheduler settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the poll interval cannot be
    /// parsed.
    pub fn schedule_config(&self) -> Result<ScheduleConfig, ConfigError> {
        let mqtt = &self.api.mqtt;
        let mut config = ScheduleConfig::new(self.poll_every()?).with_prefix(&mqtt.prefix);
        if mqtt.home_assistant.enabled {
            config = config.with_entity_discovery();
        }
        Ok(config)
    }
}

impl MqttSettings {
    /// Builds the bus settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a duration cannot be parsed.
    #[cfg(feature = "mqtt")]
    pub fn to_mqtt_config(&self) -> Result<MqttConfig, ConfigError> {
        let mut config = MqttConfig::new(self.urls.clone())
            .with_prefix(&self.prefix)
            .with_group(&self.group)
            .with_connect_timeout(parse_duration("api.mqtt.connect_timeout", &self.connect_timeout)?)
            .with_connect_retry_delay(parse_duration(
                "api.mqtt.connect_retry_delay",
                &self.connect_retry_delay,
            )?)
            .with_keep_alive(parse_duration("api.mqtt.keep_alive_interval", &self.keep_alive_interval)?)
            .with_discovery_prefix(&self.home_assistant.discovery_prefix);

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config = config.with_credentials(username, password);
        }
        Ok(config)
    }
}

impl EzrSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::validation("ezr.name", "must not be empty"));
        }
        if self.name.contains(['/', '+', '#']) {
            return Err(ConfigError::validation(
                "ezr.name",
                format!("{} contains a topic separator or wildcard", self.name),
            ));
        }

        if self.kind == TransportKind::Http {
            match &self.http {
                Some(http) if !http.host.is_empty() => {
                    if let Some(timeout) = &http.timeout {
                        parse_duration("ezr.http.timeout", timeout)?;
                    }
                }
                _ => {
                    return Err(ConfigError::validation(
                        "ezr.http.host",
                        format!("required for http device {}", self.name),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl HttpSettings {
    /// Builds the transport settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the timeout cannot be parsed.
    #[cfg(feature = "http")]
    pub fn to_http_config(&self) -> Result<HttpConfig, ConfigError> {
        let mut config = HttpConfig::new(&self.host);
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(timeout) = &self.timeout {
            config = config.with_timeout(parse_duration("ezr.http.timeout", timeout)?);
        }
        Ok(config)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|e| ConfigError::validation(field, format!("{value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.poll_every().unwrap(), Duration::from_secs(60));
        assert_eq!(config.ezr.len(), 1);
        assert_eq!(config.ezr[0].kind, TransportKind::Mock);
        assert_eq!(config.api.mqtt.urls, vec!["mqtt://mqtt:1883".to_string()]);
    }

    #[test]
    fn yaml_overlays_defaults() {
        let config = Config::from_yaml(
            r"
api:
  mqtt:
    prefix: heating
    home_assistant:
      enabled: true
ezr:
  - name: floor1
    type: http
    http:
      host: 192.168.1.50
      timeout: 5s
general:
  poll_every: 30s
",
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.api.mqtt.prefix, "heating");
        assert_eq!(config.api.mqtt.group, "ezr2mqtt");
        assert_eq!(config.api.mqtt.home_assistant.discovery_prefix, "homeassistant");
        assert_eq!(config.ezr.len(), 1);
        assert_eq!(config.ezr[0].name, "floor1");
        assert_eq!(config.poll_every().unwrap(), Duration::from_secs(30));

        let schedule = config.schedule_config().unwrap();
        assert_eq!(schedule.prefix(), "heating");
        assert!(schedule.entity_discovery());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/ezr2mqtt/config.yaml").unwrap();
        assert_eq!(config.ezr, Config::default().ezr);
        assert_eq!(config.general, GeneralSettings::default());
    }

    #[test]
    fn unknown_transport_kind_is_rejected() {
        let err = Config::from_yaml("ezr:\n  - name: x\n    type: serial\n").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn validation_failures() {
        let cases: Vec<(&str, Box<dyn Fn(&mut Config)>)> = vec![
            ("api.mqtt.urls", Box::new(|c: &mut Config| c.api.mqtt.urls.clear())),
            ("api.mqtt.urls", Box::new(|c: &mut Config| c.api.mqtt.urls = vec!["mqtt://host:port".to_string()])),
            ("api.mqtt.prefix", Box::new(|c: &mut Config| c.api.mqtt.prefix.clear())),
            ("api.mqtt.group", Box::new(|c: &mut Config| c.api.mqtt.group.clear())),
            ("api.mqtt.connect_timeout", Box::new(|c: &mut Config| c.api.mqtt.connect_timeout = "soon".to_string())),
            ("api.mqtt.username", Box::new(|c: &mut Config| c.api.mqtt.username = Some("u".to_string()))),
            ("general.poll_every", Box::new(|c: &mut Config| c.general.poll_every = "0s".to_string())),
            ("ezr", Box::new(|c: &mut Config| c.ezr.clear())),
            ("ezr.name", Box::new(|c: &mut Config| c.ezr[0].name.clear())),
            ("ezr.name", Box::new(|c: &mut Config| c.ezr[0].name = "a/b".to_string())),
            (
                "ezr.name",
                Box::new(|c: &mut Config| {
                    let duplicate = c.ezr[0].clone();
                    c.ezr.push(duplicate);
                }),
            ),
            ("ezr.http.host", Box::new(|c: &mut Config| c.ezr[0].kind = TransportKind::Http)),
        ];

        for (field, mutate) in cases {
            let mut config = Config::default();
            mutate(&mut config);
            match config.validate() {
                Err(ConfigError::Validation { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected validation error on {field}, got {other:?}"),
            }
        }
    }

    #[cfg(feature = "mqtt")]
    #[test]
    fn converts_to_mqtt_config() {
        let mut settings = MqttSettings::default();
        settings.connect_timeout = "3s".to_string();
        settings.username = Some("user".to_string());
        settings.password = Some("secret".to_string());

        let config = settings.to_mqtt_config().unwrap();
        assert_eq!(config.urls(), ["mqtt://mqtt:1883".to_string()]);
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.keep_alive(), Duration::from_secs(60));
        assert!(config.has_credentials());
    }

    #[cfg(feature = "http")]
    #[test]
    fn converts_to_http_config() {
        let settings = HttpSettings {
            host: "192.168.1.50".to_string(),
            port: Some(8080),
            timeout: Some("2s".to_string()),
        };

        let config = settings.to_http_config().unwrap();
        assert_eq!(config.host(), "192.168.1.50");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}

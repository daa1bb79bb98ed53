// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ezr2mqtt` bridge.
//!
//! This module provides the error hierarchy used across the crate: malformed
//! bus input, device and bus transport failures, wire decoding, and
//! configuration problems.
//!
//! None of these errors is fatal to a running bridge. Malformed bus messages
//! and unknown devices cause a single message to be dropped, transport errors
//! cause a single poll cycle to be skipped.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to a device or to the bus.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding or encoding a document.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An inbound bus message could not be understood.
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// The configuration is unusable.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// No transport is registered under this device name.
    #[error("no transport registered for device {0}")]
    UnknownDevice(String),

    /// The device is registered but its identity has not been polled yet.
    #[error("device {0} has not been discovered yet")]
    DeviceNotDiscovered(String),
}

/// Errors related to device (HTTP) and bus (MQTT) communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the device or broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },
}

/// Errors related to decoding and encoding device or bus documents.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML decoding or encoding failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON decoding or encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised for malformed inbound bus messages.
///
/// A message failing with one of these is logged and dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The topic does not match `<prefix>/<device>/<room>/set/<type>`.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// The room segment is not a non-negative integer.
    #[error("invalid room number: {0}")]
    InvalidRoom(String),

    /// The message type is not a known command.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The payload of a temperature command is not a decimal number.
    #[error("invalid temperature target value: {0}")]
    InvalidTemperature(String),

    /// The payload of a mode command is not `auto`, `day` or `night`.
    #[error("unknown heatarea mode: {0}")]
    UnknownMode(String),
}

/// Errors related to loading and validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or extracted.
    #[error("config loading failed: {0}")]
    Load(Box<figment::Error>),

    /// A configuration value is invalid.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Dotted path of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_error_display() {
        let err = MessageError::UnknownType("unknown_type".to_string());
        assert_eq!(err.to_string(), "unknown message type: unknown_type");
    }

    #[test]
    fn error_from_message_error() {
        let err: Error = MessageError::UnknownMode("eco".to_string()).into();
        assert!(matches!(err, Error::Message(MessageError::UnknownMode(ref m)) if m == "eco"));
    }

    #[test]
    fn timeout_display() {
        let err: Error = ProtocolError::Timeout(10_000).into();
        assert_eq!(err.to_string(), "protocol error: timed out after 10000 ms");
    }

    #[test]
    fn unknown_device_display() {
        let err = Error::UnknownDevice("dev1".to_string());
        assert_eq!(err.to_string(), "no transport registered for device dev1");
    }

    #[test]
    fn config_validation_display() {
        let err = ConfigError::validation("general.poll_every", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid general.poll_every: must be greater than zero"
        );
    }
}

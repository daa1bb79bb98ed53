// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus topic scheme.
//!
//! ```text
//! <prefix>/<device>/<room>/<direction>/<type>
//!   ezr   / floor1 /  1   /   set     / temperature_target
//! ```
//!
//! `direction` is `set` for commands towards a controller and `state` for
//! readings published by the bridge. Room `0` addresses the whole device.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageError;

/// Direction segment of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Command towards a controller.
    Set,
    /// Reading published by the bridge.
    State,
}

impl Direction {
    /// Returns the topic segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::State => "state",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute addressed by a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Target temperature of a room, two-decimal text.
    TemperatureTarget,
    /// Measured temperature of a room, two-decimal text.
    TemperatureActual,
    /// Operating mode of a room, `auto`, `day` or `night`.
    HeatAreaMode,
    /// Device discovery document (JSON) on room 0.
    Meta,
}

impl MessageKind {
    /// Per-room readings published on every poll.
    pub const READINGS: [Self; 3] = [
        Self::TemperatureTarget,
        Self::TemperatureActual,
        Self::HeatAreaMode,
    ];

    /// Returns the topic segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TemperatureTarget => "temperature_target",
            Self::TemperatureActual => "temperature_actual",
            Self::HeatAreaMode => "heatarea_mode",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature_target" => Ok(Self::TemperatureTarget),
            "temperature_actual" => Ok(Self::TemperatureActual),
            "heatarea_mode" => Ok(Self::HeatAreaMode),
            "meta" => Ok(Self::Meta),
            _ => Err(MessageError::UnknownType(s.to_string())),
        }
    }
}

/// Builds a full topic.
#[must_use]
pub fn topic(prefix: &str, device: &str, room: u32, direction: Direction, kind: &str) -> String {
    format!("{prefix}/{device}/{room}/{direction}/{kind}")
}

/// Returns the filter matching every command under `prefix`.
#[must_use]
pub fn command_filter(prefix: &str) -> String {
    format!("{prefix}/+/+/set/+")
}

/// A parsed inbound command topic.
///
/// The type segment is kept verbatim so the router can report unknown types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTopic<'a> {
    /// Logical device name.
    pub device: &'a str,
    /// Room number.
    pub room: u32,
    /// Message type segment.
    pub kind: &'a str,
}

impl<'a> CommandTopic<'a> {
    /// Parses `<prefix>/<device>/<room>/set/<type>`.
    ///
    /// # Errors
    ///
    /// Returns `MessageError::InvalidTopic` if the topic does not have the
    /// expected shape or prefix, and `MessageError::InvalidRoom` if the room
    /// segment is not a non-negative integer.
    pub fn parse(prefix: &str, topic: &'a str) -> Result<Self, MessageError> {
        let invalid = || MessageError::InvalidTopic(topic.to_string());

        let rest = topic
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;

        let parts: Vec<&str> = rest.split('/').collect();
        let [device, room, direction, kind] = parts.as_slice() else {
            return Err(invalid());
        };
        if device.is_empty() || kind.is_empty() || *direction != Direction::Set.as_str() {
            return Err(invalid());
        }

        let room = room
            .parse::<u32>()
            .map_err(|_| MessageError::InvalidRoom((*room).to_string()))?;

        Ok(Self {
            device,
            room,
            kind,
        })
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands accepted on `set` topics.

use std::fmt;

use crate::bus::MessageKind;
use crate::error::MessageError;
use crate::model::{DeviceMessage, HeatArea};
use crate::types::{HeatAreaMode, format_temperature, parse_temperature};

/// A validated command for one room of a controller.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::router::Command;
/// use ezr2mqtt::types::HeatAreaMode;
///
/// let command = Command::parse("heatarea_mode", 1, b"night").unwrap();
/// assert_eq!(command, Command::SetMode { room: 1, mode: HeatAreaMode::Night });
///
/// let update = command.to_update("ID-9");
/// assert_eq!(update.device.id.as_deref(), Some("ID-9"));
/// assert_eq!(update.device.heat_areas[0].mode, Some(HeatAreaMode::Night));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Changes the target temperature of a room.
    SetTargetTemperature {
        /// Room number.
        room: u32,
        /// New target in °C.
        celsius: f64,
    },
    /// Changes the operating mode of a room.
    SetMode {
        /// Room number.
        room: u32,
        /// New mode.
        mode: HeatAreaMode,
    },
}

impl Command {
    /// Parses the type segment and payload of a `set` message.
    ///
    /// # Errors
    ///
    /// - `MessageError::UnknownType` if `kind` is not a settable type
    /// - `MessageError::InvalidTemperature` if a temperature payload is not a
    ///   decimal number
    /// - `MessageError::UnknownMode` if a mode payload is not `auto`, `day` or
    ///   `night`
    pub fn parse(kind: &str, room: u32, payload: &[u8]) -> Result<Self, MessageError> {
        let payload = String::from_utf8_lossy(payload);

        match kind.parse::<MessageKind>() {
            Ok(MessageKind::TemperatureTarget) => Ok(Self::SetTargetTemperature {
                room,
                celsius: parse_temperature(&payload)?,
            }),
            Ok(MessageKind::HeatAreaMode) => Ok(Self::SetMode {
                room,
                mode: payload.trim().parse()?,
            }),
            // Readings are published by the bridge, never set
            Ok(MessageKind::TemperatureActual | MessageKind::Meta) | Err(_) => {
                Err(MessageError::UnknownType(kind.to_string()))
            }
        }
    }

    /// Returns the addressed room.
    #[must_use]
    pub const fn room(&self) -> u32 {
        match self {
            Self::SetTargetTemperature { room, .. } | Self::SetMode { room, .. } => *room,
        }
    }

    /// Returns the message type this command was parsed from.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::SetTargetTemperature { .. } => MessageKind::TemperatureTarget,
            Self::SetMode { .. } => MessageKind::HeatAreaMode,
        }
    }

    /// Builds the sparse update addressed to the controller with `device_id`.
    #[must_use]
    pub fn to_update(&self, device_id: &str) -> DeviceMessage {
        let area = match *self {
            Self::SetTargetTemperature { room, celsius } => HeatArea::new(room).with_target(celsius),
            Self::SetMode { room, mode } => HeatArea::new(room).with_mode(mode),
        };

        let mut update = DeviceMessage::heat_area_update(area);
        update.device.id = Some(device_id.to_string());
        update
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTargetTemperature { room, celsius } => {
                write!(f, "room {room} target {}", format_temperature(*celsius))
            }
            Self::SetMode { room, mode } => write!(f, "room {room} mode {mode}"),
        }
    }
}

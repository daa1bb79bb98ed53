// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Formatting of snapshots into bus messages and discovery documents.

use crate::bus::{
    BusMessage, ClimateDiscovery, Component, Direction, EntityDiscovery, HaDevice, MessageKind,
    RoomDiscovery, slug, topic,
};
use crate::error::{ParseError, Result};
use crate::model::{Device, HeatArea};
use crate::types::{HeatAreaMode, format_temperature};

const UNIT_CELSIUS: &str = "°C";
const TARGET_STEP: f64 = 0.5;

/// Formats the readings of every room.
///
/// Each room yields up to three messages, in this order: target temperature,
/// measured temperature, mode. Attributes absent from the snapshot are
/// skipped, as are unknown modes and rooms without a number.
#[must_use]
pub fn state_messages(device: &Device) -> Vec<BusMessage> {
    let mut messages = Vec::with_capacity(device.heat_areas.len() * MessageKind::READINGS.len());

    for area in &device.heat_areas {
        let Some(room) = area.nr else { continue };

        for kind in MessageKind::READINGS {
            if let Some(data) = reading(area, kind) {
                messages.push(BusMessage::new(room, kind, data));
            }
        }
    }
    messages
}

fn reading(area: &HeatArea, kind: MessageKind) -> Option<String> {
    match kind {
        MessageKind::TemperatureTarget => area.t_target.map(format_temperature),
        MessageKind::TemperatureActual => area.t_actual.map(format_temperature),
        MessageKind::HeatAreaMode => match area.mode? {
            HeatAreaMode::Unknown(num) => {
                tracing::warn!(room = ?area.nr, mode = num, "Skipping unknown heat area mode");
                None
            }
            mode => Some(mode.as_str().to_string()),
        },
        MessageKind::Meta => None,
    }
}

/// Builds the aggregate discovery document of a device.
#[must_use]
pub fn climate_discovery(device: &Device) -> ClimateDiscovery {
    ClimateDiscovery {
        name: device.name.clone().unwrap_or_default(),
        id: device.id.clone().unwrap_or_default(),
        kind: device.kind.clone().unwrap_or_default(),
        rooms: device
            .heat_areas
            .iter()
            .filter_map(|area| {
                area.nr.map(|id| RoomDiscovery {
                    id,
                    name: area.display_name().to_string(),
                })
            })
            .collect(),
    }
}

/// Builds the `meta` message carrying the aggregate discovery document.
///
/// # Errors
///
/// Returns `ParseError::Json` if the document cannot be encoded.
pub fn meta_message(device: &Device) -> Result<BusMessage> {
    let json = serde_json::to_string(&climate_discovery(device)).map_err(ParseError::from)?;
    Ok(BusMessage::new(0, MessageKind::Meta, json))
}

/// Builds the per-entity discovery documents of a device.
///
/// Every numbered room yields a `number` for its target temperature, a
/// `sensor` for its measured temperature and a `select` for its mode, all
/// grouped under one device block.
#[must_use]
pub fn entity_discoveries(prefix: &str, device_name: &str, device: &Device) -> Vec<EntityDiscovery> {
    let ha_device = HaDevice {
        identifiers: vec![device.id.clone().unwrap_or_else(|| device_name.to_string())],
        name: Some(device.name.clone().unwrap_or_else(|| device_name.to_string())),
        manufacturer: None,
        model: device.kind.clone(),
        sw_version: device.version_sw_eth.clone(),
    };
    let device_slug = slug(device_name);

    let mut entities = Vec::with_capacity(device.heat_areas.len() * MessageKind::READINGS.len());
    for area in &device.heat_areas {
        let Some(room) = area.nr else { continue };

        let room_label = if area.display_name().is_empty() {
            format!("Room {room}")
        } else {
            area.display_name().to_string()
        };
        let room_slug = match slug(area.display_name()) {
            s if s.is_empty() => format!("room{room}"),
            s => s,
        };

        for kind in MessageKind::READINGS {
            let state_topic = topic(prefix, device_name, room, Direction::State, kind.as_str());
            let command_topic = topic(prefix, device_name, room, Direction::Set, kind.as_str());

            let mut entity = EntityDiscovery {
                component: Component::Sensor,
                name: String::new(),
                unique_id: format!("{device_slug}_{room_slug}_{kind}"),
                state_topic,
                command_topic: None,
                unit_of_measurement: None,
                device_class: None,
                state_class: None,
                minimum: None,
                maximum: None,
                step: None,
                mode: None,
                options: Vec::new(),
                device: Some(ha_device.clone()),
            };

            match kind {
                MessageKind::TemperatureTarget => {
                    entity.component = Component::Number;
                    entity.name = format!("{room_label} target temperature");
                    entity.command_topic = Some(command_topic);
                    entity.unit_of_measurement = Some(UNIT_CELSIUS.to_string());
                    entity.device_class = Some("temperature".to_string());
                    entity.minimum = area.t_target_min;
                    entity.maximum = area.t_target_max;
                    entity.step = Some(TARGET_STEP);
                    entity.mode = Some("box".to_string());
                }
                MessageKind::TemperatureActual => {
                    entity.name = format!("{room_label} temperature");
                    entity.unit_of_measurement = Some(UNIT_CELSIUS.to_string());
                    entity.device_class = Some("temperature".to_string());
                    entity.state_class = Some("measurement".to_string());
                }
                MessageKind::HeatAreaMode => {
                    entity.component = Component::Select;
                    entity.name = format!("{room_label} mode");
                    entity.command_topic = Some(command_topic);
                    entity.options = HeatAreaMode::ALL
                        .iter()
                        .map(|mode| mode.as_str().to_string())
                        .collect();
                }
                MessageKind::Meta => continue,
            }
            entities.push(entity);
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn mock_device() -> Device {
        MockTransport::new().snapshot().device
    }

    #[test]
    fn two_rooms_yield_six_readings() {
        let messages = state_messages(&mock_device());
        assert_eq!(messages.len(), 6);

        assert_eq!(
            messages[0],
            BusMessage::new(1, MessageKind::TemperatureTarget, "22.00")
        );
        assert_eq!(
            messages[1],
            BusMessage::new(1, MessageKind::TemperatureActual, "21.50")
        );
        assert_eq!(messages[2], BusMessage::new(1, MessageKind::HeatAreaMode, "auto"));
        assert_eq!(messages[5], BusMessage::new(2, MessageKind::HeatAreaMode, "night"));
    }

    #[test]
    fn absent_readings_are_skipped() {
        let device = Device {
            heat_areas: vec![HeatArea::new(4).with_target(20.0), HeatArea::default()],
            ..Device::default()
        };

        assert_eq!(
            state_messages(&device),
            vec![BusMessage::new(4, MessageKind::TemperatureTarget, "20.00")]
        );
    }

    #[test]
    fn unknown_mode_is_skipped() {
        let mut device = mock_device();
        device.heat_areas[0].mode = Some(HeatAreaMode::Unknown(3));

        let messages = state_messages(&device);
        assert_eq!(messages.len(), 5);
        assert!(
            messages
                .iter()
                .all(|m| !(m.room == 1 && m.kind == MessageKind::HeatAreaMode))
        );
        assert_eq!(
            messages[1],
            BusMessage::new(1, MessageKind::TemperatureActual, "21.50")
        );
    }

    #[test]
    fn target_reading_round_trips() {
        let device = Device {
            heat_areas: vec![HeatArea::new(1).with_target(23.456)],
            ..Device::default()
        };
        let message = &state_messages(&device)[0];
        let parsed = crate::types::parse_temperature(&message.data).unwrap();
        assert!((parsed - 23.46).abs() < 1e-9);
    }

    #[test]
    fn meta_document() {
        let message = meta_message(&mock_device()).unwrap();
        assert_eq!(message.room, 0);
        assert_eq!(message.kind, MessageKind::Meta);

        let meta: ClimateDiscovery = serde_json::from_str(&message.data).unwrap();
        assert_eq!(meta.id, "MOCK-12345");
        assert_eq!(meta.kind, "EZR");
        assert_eq!(meta.name, "Mock Device");
        assert_eq!(
            meta.rooms,
            vec![
                RoomDiscovery {
                    id: 1,
                    name: "Living Room".to_string()
                },
                RoomDiscovery {
                    id: 2,
                    name: "Bedroom".to_string()
                },
            ]
        );
    }

    #[test]
    fn entity_documents_per_room() {
        let entities = entity_discoveries("ezr", "ezr-mock", &mock_device());
        assert_eq!(entities.len(), 6);

        let target = &entities[0];
        assert_eq!(target.component, Component::Number);
        assert_eq!(target.unique_id, "ezr_mock_living_room_temperature_target");
        assert_eq!(target.state_topic, "ezr/ezr-mock/1/state/temperature_target");
        assert_eq!(
            target.command_topic.as_deref(),
            Some("ezr/ezr-mock/1/set/temperature_target")
        );
        assert_eq!(target.minimum, Some(5.0));
        assert_eq!(target.maximum, Some(30.0));
        assert_eq!(target.step, Some(0.5));

        let actual = &entities[1];
        assert_eq!(actual.component, Component::Sensor);
        assert!(actual.command_topic.is_none());
        assert_eq!(actual.state_class.as_deref(), Some("measurement"));

        let mode = &entities[2];
        assert_eq!(mode.component, Component::Select);
        assert_eq!(mode.options, vec!["auto", "day", "night"]);

        let device = target.device.as_ref().unwrap();
        assert_eq!(device.identifiers, vec!["MOCK-12345".to_string()]);
        assert_eq!(device.model.as_deref(), Some("EZR"));
    }

    #[test]
    fn unnamed_room_uses_number() {
        let device = Device {
            id: Some("ID-1".to_string()),
            heat_areas: vec![HeatArea::new(7)],
            ..Device::default()
        };
        let entities = entity_discoveries("ezr", "dev1", &device);
        assert_eq!(entities[0].unique_id, "dev1_room7_temperature_target");
        assert_eq!(entities[0].name, "Room 7 target temperature");
    }
}

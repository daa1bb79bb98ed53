// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery documents.
//!
//! Two shapes are published:
//!
//! - [`ClimateDiscovery`]: one aggregate document per device on
//!   `<prefix>/<device>/0/state/meta`, listing the device identity and its
//!   rooms.
//! - [`EntityDiscovery`]: one Home Assistant MQTT discovery document per room
//!   and attribute, on `<discovery_prefix>/<component>/<unique_id>/config`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A room entry of the aggregate discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDiscovery {
    /// Room number.
    pub id: u32,
    /// Room display name.
    pub name: String,
}

/// Aggregate discovery document of one device.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::bus::{ClimateDiscovery, RoomDiscovery};
///
/// let meta = ClimateDiscovery {
///     name: "Floor 1".to_string(),
///     id: "EZR-0001".to_string(),
///     kind: "EZR".to_string(),
///     rooms: vec![RoomDiscovery { id: 1, name: "Living Room".to_string() }],
/// };
/// let json = serde_json::to_string(&meta).unwrap();
/// assert_eq!(
///     json,
///     r#"{"name":"Floor 1","id":"EZR-0001","type":"EZR","rooms":[{"id":1,"name":"Living Room"}]}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateDiscovery {
    /// Name configured on the controller.
    pub name: String,
    /// Controller identifier.
    pub id: String,
    /// Controller model.
    #[serde(rename = "type")]
    pub kind: String,
    /// Rooms of the controller, in snapshot order.
    pub rooms: Vec<RoomDiscovery>,
}

/// Home Assistant entity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// Read-only value.
    #[default]
    Sensor,
    /// Adjustable number.
    Number,
    /// Choice among options.
    Select,
}

impl Component {
    /// Returns the discovery topic segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Number => "number",
            Self::Select => "select",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device block shared by all entities of one controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaDevice {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
}

/// Home Assistant discovery document for one room attribute.
///
/// The `component` is not part of the payload; it selects the discovery
/// topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDiscovery {
    #[serde(skip)]
    pub component: Component,
    pub name: String,
    pub unique_id: String,
    pub state_topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_class: Option<String>,
    #[serde(rename = "min", default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(rename = "max", default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Number entity display mode (`box` or `slider`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<HaDevice>,
}

impl EntityDiscovery {
    /// Returns the topic this document is published on.
    #[must_use]
    pub fn config_topic(&self, discovery_prefix: &str) -> String {
        format!(
            "{discovery_prefix}/{}/{}/config",
            self.component, self.unique_id
        )
    }
}

/// Turns a display name into a topic- and id-safe slug.
///
/// ```
/// use ezr2mqtt::bus::slug;
///
/// assert_eq!(slug("Living Room"), "living_room");
/// assert_eq!(slug("Küche 2"), "k_che_2");
/// ```
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

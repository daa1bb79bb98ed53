// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heat controllers (valve outputs) and attached I/O devices.

use serde::{Deserialize, Serialize};

use crate::types::Explicit;

/// A valve output channel of the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatCtrl {
    #[serde(rename = "@nr", skip_serializing_if = "Option::is_none")]
    pub nr: Option<u32>,
    #[serde(rename = "INUSE", skip_serializing_if = "Option::is_none")]
    pub in_use: Option<i32>,
    /// Heat area this output is assigned to.
    #[serde(rename = "HEATAREA_NR", skip_serializing_if = "Option::is_none")]
    pub heat_area_nr: Option<i32>,
    #[serde(rename = "ACTOR", skip_serializing_if = "Option::is_none")]
    pub actor: Option<i32>,
    /// Valve opening in percent; zero means closed.
    #[serde(rename = "ACTOR_PERCENT", skip_serializing_if = "Option::is_none")]
    pub actor_percent: Option<Explicit<i32>>,
    #[serde(rename = "HEATCTRL_STATE", skip_serializing_if = "Option::is_none")]
    pub state: Option<Explicit<i32>>,
}

/// A wireless or wired peripheral (room sensor, thermostat) paired with the
/// controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoDevice {
    #[serde(rename = "@nr", skip_serializing_if = "Option::is_none")]
    pub nr: Option<u32>,

    #[serde(rename = "IODEVICE_TYPE", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i32>,
    #[serde(rename = "IODEVICE_ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,

    #[serde(rename = "IODEVICE_VERS_HW", skip_serializing_if = "Option::is_none")]
    pub version_hw: Option<String>,
    #[serde(rename = "IODEVICE_VERS_SW", skip_serializing_if = "Option::is_none")]
    pub version_sw: Option<String>,

    #[serde(rename = "HEATAREA_NR", skip_serializing_if = "Option::is_none")]
    pub heat_area_nr: Option<i32>,

    #[serde(rename = "SIGNALSTRENGTH", skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i32>,
    #[serde(rename = "BATTERY", skip_serializing_if = "Option::is_none")]
    pub battery: Option<i32>,

    #[serde(rename = "IODEVICE_STATE", skip_serializing_if = "Option::is_none")]
    pub state: Option<Explicit<i32>>,
    #[serde(rename = "IODEVICE_COMERROR", skip_serializing_if = "Option::is_none")]
    pub com_error: Option<i32>,
    #[serde(rename = "ISON", skip_serializing_if = "Option::is_none")]
    pub is_on: Option<i32>,
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The EZR controller document.
//!
//! A single type hierarchy describes both the full snapshot reported by a
//! controller and the sparse update sent to it. Every field is an `Option`:
//! `None` means the field is absent from the document, which is distinct from
//! a present zero.
//!
//! # Wire format
//!
//! ```text
//! <Devices>
//!   <Device>
//!     <ID>...</ID>
//!     <HEATAREA nr="1"><HEATAREA_NAME>Living Room</HEATAREA_NAME>...</HEATAREA>
//!     <HEATCTRL nr="1">...</HEATCTRL>
//!   </Device>
//! </Devices>
//! ```
//!
//! Keyed lists (`HEATAREA`, `HEATCTRL`, `IODEVICE`, `SHIFT_PROGRAM`) are
//! identified by their `nr` attribute.

mod controller;
mod heat_area;
mod settings;

pub use controller::{HeatCtrl, IoDevice};
pub use heat_area::HeatArea;
pub use settings::{
    ChangeoverFunc, Cloud, Code, EmergencyMode, KwlCtrl, Network, Program, PumpOutput,
    PumpProtect, Relais, ShiftProgram, Vacation, ValveProtect,
};

use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::error::ParseError;

/// Root of a controller document (`<Devices><Device>...</Device></Devices>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Devices")]
pub struct DeviceMessage {
    /// The device payload.
    #[serde(rename = "Device", default)]
    pub device: Device,
}

impl DeviceMessage {
    /// Wraps a device document.
    #[must_use]
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Builds a sparse update touching a single heat area.
    #[must_use]
    pub fn heat_area_update(area: HeatArea) -> Self {
        Self::new(Device {
            heat_areas: vec![area],
            ..Device::default()
        })
    }

    /// Decodes a controller XML document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Xml` if the document is not a valid `Devices` tree.
    #[cfg(feature = "http")]
    pub fn from_xml(xml: &str) -> Result<Self, ParseError> {
        quick_xml::de::from_str(xml).map_err(|e| ParseError::Xml(e.to_string()))
    }

    /// Encodes this document as XML, without declaration.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Xml` if serialization fails.
    #[cfg(feature = "http")]
    pub fn to_xml(&self) -> Result<String, ParseError> {
        quick_xml::se::to_string(self).map_err(|e| ParseError::Xml(e.to_string()))
    }
}

/// Full state of one controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    // Identification
    /// Opaque identifier assigned by the controller. Stable for its lifetime.
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model designation.
    #[serde(rename = "TYPE", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Name configured on the controller.
    #[serde(rename = "NAME", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "ORIGIN", skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    // System
    #[serde(rename = "ERRORCOUNT", skip_serializing_if = "Option::is_none")]
    pub error_count: Option<i32>,
    #[serde(rename = "DATETIME", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(rename = "DAYOFWEEK", skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<i32>,
    #[serde(rename = "TIMEZONE", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<i32>,
    #[serde(rename = "NTPTIMESYNC", skip_serializing_if = "Option::is_none")]
    pub ntp_sync: Option<i32>,

    #[serde(rename = "VERS_SW_STM", skip_serializing_if = "Option::is_none")]
    pub version_sw_stm: Option<String>,
    /// Firmware version of the network module.
    #[serde(rename = "VERS_SW_ETH", skip_serializing_if = "Option::is_none")]
    pub version_sw_eth: Option<String>,
    #[serde(rename = "VERS_HW", skip_serializing_if = "Option::is_none")]
    pub version_hw: Option<String>,

    #[serde(rename = "TEMPERATUREUNIT", skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<i32>,
    #[serde(rename = "SUMMERWINTER", skip_serializing_if = "Option::is_none")]
    pub summer_winter: Option<i32>,
    #[serde(rename = "TPS", skip_serializing_if = "Option::is_none")]
    pub tps: Option<i32>,
    #[serde(rename = "LIMITER", skip_serializing_if = "Option::is_none")]
    pub limiter: Option<i32>,

    #[serde(rename = "MASTERID", skip_serializing_if = "Option::is_none")]
    pub master_id: Option<String>,
    #[serde(rename = "CHANGEOVER", skip_serializing_if = "Option::is_none")]
    pub changeover: Option<i32>,
    #[serde(rename = "COOLING", skip_serializing_if = "Option::is_none")]
    pub cooling: Option<i32>,
    /// Device-wide mode. Unlike heat area modes, zero here means "unset".
    #[serde(rename = "MODE", skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,

    #[serde(rename = "OPERATIONMODE_ACTOR", skip_serializing_if = "Option::is_none")]
    pub operation_mode_actor: Option<i32>,

    #[serde(rename = "ANTIFREEZE", skip_serializing_if = "Option::is_none")]
    pub antifreeze: Option<i32>,
    #[serde(rename = "ANTIFREEZE_TEMP", skip_serializing_if = "Option::is_none")]
    pub antifreeze_temp: Option<f64>,

    #[serde(rename = "FIRSTOPEN_TIME", skip_serializing_if = "Option::is_none")]
    pub first_open_time: Option<i32>,
    #[serde(rename = "SMARTSTART", skip_serializing_if = "Option::is_none")]
    pub smart_start: Option<i32>,

    #[serde(rename = "ECO_DIFF", skip_serializing_if = "Option::is_none")]
    pub eco_diff: Option<f64>,
    #[serde(rename = "ECO_INPUTMODE", skip_serializing_if = "Option::is_none")]
    pub eco_input_mode: Option<i32>,
    #[serde(rename = "ECO_INPUT_STATE", skip_serializing_if = "Option::is_none")]
    pub eco_input_state: Option<i32>,

    #[serde(rename = "T_HEAT_VACATION", skip_serializing_if = "Option::is_none")]
    pub t_heat_vacation: Option<f64>,

    // Settings groups
    #[serde(rename = "VACATION", skip_serializing_if = "Option::is_none")]
    pub vacation: Option<Vacation>,
    #[serde(rename = "NETWORK", skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(rename = "CLOUD", skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,
    #[serde(rename = "KWLCTRL", skip_serializing_if = "Option::is_none")]
    pub kwl_ctrl: Option<KwlCtrl>,
    #[serde(rename = "CODE", skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(rename = "PROGRAM", skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(rename = "PUMP_OUTPUT", skip_serializing_if = "Option::is_none")]
    pub pump_output: Option<PumpOutput>,
    #[serde(rename = "RELAIS", skip_serializing_if = "Option::is_none")]
    pub relais: Option<Relais>,
    #[serde(rename = "CHANGEOVER_FUNC", skip_serializing_if = "Option::is_none")]
    pub changeover_func: Option<ChangeoverFunc>,
    #[serde(rename = "EMERGENCYMODE", skip_serializing_if = "Option::is_none")]
    pub emergency_mode: Option<EmergencyMode>,
    #[serde(rename = "VALVEPROTECT", skip_serializing_if = "Option::is_none")]
    pub valve_protect: Option<ValveProtect>,
    #[serde(rename = "PUMPPROTECT", skip_serializing_if = "Option::is_none")]
    pub pump_protect: Option<PumpProtect>,

    // Keyed lists
    /// Rooms, keyed by `nr`.
    #[serde(rename = "HEATAREA", skip_serializing_if = "Vec::is_empty")]
    pub heat_areas: Vec<HeatArea>,
    /// Valve outputs, keyed by `nr`.
    #[serde(rename = "HEATCTRL", skip_serializing_if = "Vec::is_empty")]
    pub heat_ctrls: Vec<HeatCtrl>,
    /// Paired peripherals, keyed by `nr`.
    #[serde(rename = "IODEVICE", skip_serializing_if = "Vec::is_empty")]
    pub io_devices: Vec<IoDevice>,
}

impl Device {
    /// Returns the heat area with the given number.
    #[must_use]
    pub fn heat_area(&self, nr: u32) -> Option<&HeatArea> {
        self.heat_areas.iter().find(|area| area.nr == Some(nr))
    }

    /// Returns the heat controller with the given number.
    #[must_use]
    pub fn heat_ctrl(&self, nr: u32) -> Option<&HeatCtrl> {
        self.heat_ctrls.iter().find(|ctrl| ctrl.nr == Some(nr))
    }
}

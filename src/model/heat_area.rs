// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heat areas (rooms).

use serde::{Deserialize, Serialize};

use crate::types::{Explicit, HeatAreaMode};

/// One independently controllable thermal zone of a controller.
///
/// Heat areas are identified by their `nr` attribute, which is stable across
/// snapshots and unique within one document. Every other field is optional so
/// the same type serves as a full snapshot entry and as a sparse update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatArea {
    /// Identity of the heat area.
    #[serde(rename = "@nr", skip_serializing_if = "Option::is_none")]
    pub nr: Option<u32>,
    /// Display name.
    #[serde(rename = "HEATAREA_NAME", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Operating mode.
    #[serde(rename = "HEATAREA_MODE", skip_serializing_if = "Option::is_none")]
    pub mode: Option<HeatAreaMode>,

    /// Measured temperature in °C.
    #[serde(rename = "T_ACTUAL", skip_serializing_if = "Option::is_none")]
    pub t_actual: Option<f64>,
    /// Temperature measured by an external sensor in °C.
    #[serde(rename = "T_ACTUAL_EXT", skip_serializing_if = "Option::is_none")]
    pub t_actual_ext: Option<f64>,
    /// Target temperature in °C.
    #[serde(rename = "T_TARGET", skip_serializing_if = "Option::is_none")]
    pub t_target: Option<f64>,
    #[serde(rename = "T_TARGET_BASE", skip_serializing_if = "Option::is_none")]
    pub t_target_base: Option<f64>,

    /// Heat area status flags.
    #[serde(rename = "HEATAREA_STATE", skip_serializing_if = "Option::is_none")]
    pub state: Option<Explicit<i32>>,

    #[serde(rename = "PROGRAM_SOURCE", skip_serializing_if = "Option::is_none")]
    pub program_source: Option<i32>,
    #[serde(rename = "PROGRAM_WEEK", skip_serializing_if = "Option::is_none")]
    pub program_week: Option<i32>,
    #[serde(rename = "PROGRAM_WEEKEND", skip_serializing_if = "Option::is_none")]
    pub program_weekend: Option<i32>,

    #[serde(rename = "PARTY", skip_serializing_if = "Option::is_none")]
    pub party: Option<i32>,
    #[serde(rename = "PARTY_REMAININGTIME", skip_serializing_if = "Option::is_none")]
    pub party_remaining_time: Option<i32>,
    #[serde(rename = "PRESENCE", skip_serializing_if = "Option::is_none")]
    pub presence: Option<i32>,

    /// Lowest target temperature the area accepts.
    #[serde(rename = "T_TARGET_MIN", skip_serializing_if = "Option::is_none")]
    pub t_target_min: Option<f64>,
    /// Highest target temperature the area accepts.
    #[serde(rename = "T_TARGET_MAX", skip_serializing_if = "Option::is_none")]
    pub t_target_max: Option<f64>,

    #[serde(rename = "RPM_MOTOR", skip_serializing_if = "Option::is_none")]
    pub rpm_motor: Option<i32>,
    #[serde(rename = "OFFSET", skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    #[serde(rename = "T_HEAT_DAY", skip_serializing_if = "Option::is_none")]
    pub t_heat_day: Option<f64>,
    #[serde(rename = "T_HEAT_NIGHT", skip_serializing_if = "Option::is_none")]
    pub t_heat_night: Option<f64>,
    #[serde(rename = "T_COOL_DAY", skip_serializing_if = "Option::is_none")]
    pub t_cool_day: Option<f64>,
    #[serde(rename = "T_COOL_NIGHT", skip_serializing_if = "Option::is_none")]
    pub t_cool_night: Option<f64>,
    #[serde(rename = "T_FLOOR_DAY", skip_serializing_if = "Option::is_none")]
    pub t_floor_day: Option<f64>,

    #[serde(rename = "HEATINGSYSTEM", skip_serializing_if = "Option::is_none")]
    pub heating_system: Option<i32>,
    #[serde(rename = "BLOCK_HC", skip_serializing_if = "Option::is_none")]
    pub block_hc: Option<i32>,

    #[serde(rename = "ISLOCKED", skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<i32>,
    #[serde(rename = "LOCK_CODE", skip_serializing_if = "Option::is_none")]
    pub lock_code: Option<String>,
    #[serde(rename = "LOCK_AVAILABLE", skip_serializing_if = "Option::is_none")]
    pub lock_available: Option<i32>,

    #[serde(rename = "LIGHT", skip_serializing_if = "Option::is_none")]
    pub light: Option<i32>,
    #[serde(rename = "SENSOR_EXT", skip_serializing_if = "Option::is_none")]
    pub sensor_ext: Option<i32>,
    #[serde(rename = "T_TARGET_ADJUSTABLE", skip_serializing_if = "Option::is_none")]
    pub adjustable: Option<i32>,
}

impl HeatArea {
    /// Creates an empty heat area carrying only its identity.
    #[must_use]
    pub fn new(nr: u32) -> Self {
        Self {
            nr: Some(nr),
            ..Self::default()
        }
    }

    /// Sets the target temperature.
    #[must_use]
    pub fn with_target(mut self, celsius: f64) -> Self {
        self.t_target = Some(celsius);
        self
    }

    /// Sets the operating mode.
    #[must_use]
    pub fn with_mode(mut self, mode: HeatAreaMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Returns the display name, or an empty string when unknown.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

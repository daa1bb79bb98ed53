// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-wide settings groups.
//!
//! These are nested documents without an identity key. Partial updates merge
//! into them field by field.

use serde::{Deserialize, Serialize};

/// Vacation schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vacation {
    #[serde(rename = "VACATION_STATE", skip_serializing_if = "Option::is_none")]
    pub state: Option<i32>,
    /// Start date as `dd.mm.yyyy`.
    #[serde(rename = "START_DATE", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Start time as `hh:mm`.
    #[serde(rename = "START_TIME", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "END_DATE", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(rename = "END_TIME", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Network configuration and status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    #[serde(rename = "MAC", skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(rename = "DHCP", skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<i32>,
    #[serde(rename = "IPV6ACTIVE", skip_serializing_if = "Option::is_none")]
    pub ipv6_active: Option<i32>,
    #[serde(rename = "IPV4ACTUAL", skip_serializing_if = "Option::is_none")]
    pub ipv4_actual: Option<String>,
    #[serde(rename = "IPV4SET", skip_serializing_if = "Option::is_none")]
    pub ipv4_set: Option<String>,
    #[serde(rename = "IPV6ACTUAL", skip_serializing_if = "Option::is_none")]
    pub ipv6_actual: Option<String>,
    #[serde(rename = "IPV6SET", skip_serializing_if = "Option::is_none")]
    pub ipv6_set: Option<String>,
    #[serde(rename = "NETMASKACTUAL", skip_serializing_if = "Option::is_none")]
    pub netmask_actual: Option<String>,
    #[serde(rename = "NETMASKSET", skip_serializing_if = "Option::is_none")]
    pub netmask_set: Option<String>,
    #[serde(rename = "DNS", skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
    #[serde(rename = "GATEWAY", skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Vendor cloud (M2M) connectivity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cloud {
    #[serde(rename = "USERID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "PASSWORD", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "M2MSERVERPORT", skip_serializing_if = "Option::is_none")]
    pub m2m_server_port: Option<i32>,
    #[serde(rename = "M2MLOCALPORT", skip_serializing_if = "Option::is_none")]
    pub m2m_local_port: Option<i32>,
    #[serde(rename = "M2MHTTPPORT", skip_serializing_if = "Option::is_none")]
    pub m2m_http_port: Option<i32>,
    #[serde(rename = "M2MHTTPSPORT", skip_serializing_if = "Option::is_none")]
    pub m2m_https_port: Option<i32>,
    #[serde(rename = "M2MSERVERADDRESS", skip_serializing_if = "Option::is_none")]
    pub m2m_server_address: Option<String>,
    #[serde(rename = "M2MACTIVE", skip_serializing_if = "Option::is_none")]
    pub m2m_active: Option<i32>,
    #[serde(rename = "M2MSTATE", skip_serializing_if = "Option::is_none")]
    pub m2m_state: Option<String>,
}

/// Ventilation unit (KWL) coupling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KwlCtrl {
    #[serde(rename = "KWL_CONTROL_VISIBLE", skip_serializing_if = "Option::is_none")]
    pub visible: Option<i32>,
    #[serde(rename = "KWL_PRESENT", skip_serializing_if = "Option::is_none")]
    pub present: Option<i32>,
    #[serde(rename = "KWL_CONNECTION", skip_serializing_if = "Option::is_none")]
    pub connection: Option<i32>,
    #[serde(rename = "KWL_URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "KWL_PORT", skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(rename = "KWL_STATUS", skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(rename = "KWL_FLOWCTRL", skip_serializing_if = "Option::is_none")]
    pub flow_ctrl: Option<i32>,
}

/// Access codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Code {
    #[serde(rename = "EXPERT", skip_serializing_if = "Option::is_none")]
    pub expert: Option<String>,
}

/// Time programs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Program {
    /// Shift programs, keyed by `nr`.
    #[serde(rename = "SHIFT_PROGRAM", skip_serializing_if = "Vec::is_empty")]
    pub shift_programs: Vec<ShiftProgram>,
}

/// One slot of a time program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftProgram {
    #[serde(rename = "@nr", skip_serializing_if = "Option::is_none")]
    pub nr: Option<u32>,
    #[serde(rename = "@shiftingtime", skip_serializing_if = "Option::is_none")]
    pub shifting_time: Option<i32>,
    #[serde(rename = "START", skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(rename = "END", skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Pump output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpOutput {
    #[serde(rename = "LOCALGLOBAL", skip_serializing_if = "Option::is_none")]
    pub local_global: Option<i32>,
    #[serde(rename = "PUMP_OUTPUT_TYPE", skip_serializing_if = "Option::is_none")]
    pub kind: Option<i32>,
    #[serde(rename = "PUMP_LEADTIME", skip_serializing_if = "Option::is_none")]
    pub lead_time: Option<i32>,
    #[serde(rename = "PUMP_STOPPINGTIME", skip_serializing_if = "Option::is_none")]
    pub stopping_time: Option<i32>,
    #[serde(rename = "PUMP_OPERATIONMODE", skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<i32>,
    #[serde(rename = "MINRUNTIME", skip_serializing_if = "Option::is_none")]
    pub min_runtime: Option<i32>,
    #[serde(rename = "MINSTANDSTILL", skip_serializing_if = "Option::is_none")]
    pub min_standstill: Option<i32>,
}

/// Relay output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relais {
    #[serde(rename = "FUNCTION", skip_serializing_if = "Option::is_none")]
    pub function: Option<i32>,
    #[serde(rename = "RELAIS_LEADTIME", skip_serializing_if = "Option::is_none")]
    pub lead_time: Option<i32>,
    #[serde(rename = "RELAIS_STOPPINGTIME", skip_serializing_if = "Option::is_none")]
    pub stopping_time: Option<i32>,
    #[serde(rename = "RELAIS_OPERATIONMODE", skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<i32>,
}

/// Heating/cooling changeover.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeoverFunc {
    #[serde(rename = "CHANGEOVER_FUNC_MODE", skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,
}

/// Behaviour when a room sensor stops reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyMode {
    #[serde(rename = "EMERGENCYMODE_TIME", skip_serializing_if = "Option::is_none")]
    pub time: Option<i32>,
    #[serde(rename = "PWMCYCLE", skip_serializing_if = "Option::is_none")]
    pub pwm_cycle: Option<i32>,
    #[serde(rename = "PWMHEAT", skip_serializing_if = "Option::is_none")]
    pub pwm_heat: Option<i32>,
    #[serde(rename = "PWMCOOL", skip_serializing_if = "Option::is_none")]
    pub pwm_cool: Option<i32>,
}

/// Periodic valve exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValveProtect {
    #[serde(rename = "VALVEPROTECT_TIME", skip_serializing_if = "Option::is_none")]
    pub time: Option<i32>,
    #[serde(rename = "DURATION", skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
}

/// Periodic pump exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpProtect {
    #[serde(rename = "PUMPPROTECT_TIME", skip_serializing_if = "Option::is_none")]
    pub time: Option<i32>,
    #[serde(rename = "DURATION", skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
}

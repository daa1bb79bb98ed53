// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partial-update merging.
//!
//! A sparse update document is merged into a full snapshot in place:
//!
//! - Scalar fields overwrite the target only when present and not blank
//!   (non-empty string, non-zero number).
//! - Fields typed [`HeatAreaMode`] or [`Explicit`] are never blank, so a
//!   present zero is applied.
//! - Nested settings groups recurse with the scalar rule.
//! - Keyed lists are reconciled by `nr`: matching elements merge, unknown
//!   numbers append as full entries, untouched elements stay as they are.
//!
//! Merging never fails and is idempotent.
//!
//! # Examples
//!
//! ```
//! use ezr2mqtt::merge::Merge;
//! use ezr2mqtt::model::{DeviceMessage, HeatArea};
//! use ezr2mqtt::types::HeatAreaMode;
//!
//! let mut snapshot = DeviceMessage::heat_area_update(
//!     HeatArea::new(1).with_target(21.0).with_mode(HeatAreaMode::Day),
//! );
//! let update = DeviceMessage::heat_area_update(HeatArea::new(1).with_mode(HeatAreaMode::Auto));
//!
//! snapshot.merge(&update);
//! let area = snapshot.device.heat_area(1).unwrap();
//! assert_eq!(area.mode, Some(HeatAreaMode::Auto));
//! assert_eq!(area.t_target, Some(21.0));
//! ```

use crate::model::{
    ChangeoverFunc, Cloud, Code, Device, DeviceMessage, EmergencyMode, HeatArea, HeatCtrl,
    IoDevice, KwlCtrl, Network, Program, PumpOutput, PumpProtect, Relais, ShiftProgram, Vacation,
    ValveProtect,
};
use crate::types::{Explicit, HeatAreaMode};

/// Merges a sparse update into `self` in place.
pub trait Merge {
    /// Applies every meaningful field of `update` to `self`.
    fn merge(&mut self, update: &Self);
}

/// A scalar that may be blank in a sparse document.
pub trait Sparse {
    /// Returns `true` if the value carries no information and must not
    /// overwrite a target.
    fn is_blank(&self) -> bool;
}

/// A list element identified by a stable number.
pub trait Keyed {
    /// Returns the identity of this element, if it has one.
    fn key(&self) -> Option<u32>;
}

impl Sparse for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Sparse for i32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Sparse for u32 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Sparse for f64 {
    #[allow(clippy::float_cmp)]
    fn is_blank(&self) -> bool {
        *self == 0.0
    }
}

impl Sparse for HeatAreaMode {
    fn is_blank(&self) -> bool {
        false
    }
}

impl<T> Sparse for Explicit<T> {
    fn is_blank(&self) -> bool {
        false
    }
}

fn merge_value<T: Sparse + Clone>(target: &mut Option<T>, update: Option<&T>) {
    if let Some(value) = update
        && !value.is_blank()
    {
        *target = Some(value.clone());
    }
}

fn merge_nested<T: Merge + Default>(target: &mut Option<T>, update: Option<&T>) {
    if let Some(value) = update {
        target.get_or_insert_with(T::default).merge(value);
    }
}

fn merge_keyed<T: Keyed + Merge + Clone>(target: &mut Vec<T>, update: &[T]) {
    for item in update {
        // Elements without identity cannot be matched.
        let Some(key) = item.key() else {
            continue;
        };
        match target.iter_mut().find(|existing| existing.key() == Some(key)) {
            Some(existing) => existing.merge(item),
            None => target.push(item.clone()),
        }
    }
}

/// Expands to one merge call per field, by field kind.
macro_rules! merge_fields {
    ($target:ident, $update:ident, { $($kind:ident $field:ident),* $(,)? }) => {
        $( merge_fields!(@$kind $target.$field, $update.$field); )*
    };
    (@value $t:expr, $u:expr) => {
        merge_value(&mut $t, $u.as_ref())
    };
    (@nested $t:expr, $u:expr) => {
        merge_nested(&mut $t, $u.as_ref())
    };
    (@keyed $t:expr, $u:expr) => {
        merge_keyed(&mut $t, &$u)
    };
}

impl Merge for DeviceMessage {
    fn merge(&mut self, update: &Self) {
        self.device.merge(&update.device);
    }
}

impl Merge for Device {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value id,
            value kind,
            value name,
            value origin,
            value error_count,
            value date_time,
            value day_of_week,
            value time_zone,
            value ntp_sync,
            value version_sw_stm,
            value version_sw_eth,
            value version_hw,
            value temperature_unit,
            value summer_winter,
            value tps,
            value limiter,
            value master_id,
            value changeover,
            value cooling,
            value mode,
            value operation_mode_actor,
            value antifreeze,
            value antifreeze_temp,
            value first_open_time,
            value smart_start,
            value eco_diff,
            value eco_input_mode,
            value eco_input_state,
            value t_heat_vacation,
            nested vacation,
            nested network,
            nested cloud,
            nested kwl_ctrl,
            nested code,
            nested program,
            nested pump_output,
            nested relais,
            nested changeover_func,
            nested emergency_mode,
            nested valve_protect,
            nested pump_protect,
            keyed heat_areas,
            keyed heat_ctrls,
            keyed io_devices,
        });
    }
}

impl Keyed for HeatArea {
    fn key(&self) -> Option<u32> {
        self.nr
    }
}

impl Merge for HeatArea {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value name,
            value mode,
            value t_actual,
            value t_actual_ext,
            value t_target,
            value t_target_base,
            value state,
            value program_source,
            value program_week,
            value program_weekend,
            value party,
            value party_remaining_time,
            value presence,
            value t_target_min,
            value t_target_max,
            value rpm_motor,
            value offset,
            value t_heat_day,
            value t_heat_night,
            value t_cool_day,
            value t_cool_night,
            value t_floor_day,
            value heating_system,
            value block_hc,
            value is_locked,
            value lock_code,
            value lock_available,
            value light,
            value sensor_ext,
            value adjustable,
        });
    }
}

impl Keyed for HeatCtrl {
    fn key(&self) -> Option<u32> {
        self.nr
    }
}

impl Merge for HeatCtrl {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value in_use,
            value heat_area_nr,
            value actor,
            value actor_percent,
            value state,
        });
    }
}

impl Keyed for IoDevice {
    fn key(&self) -> Option<u32> {
        self.nr
    }
}

impl Merge for IoDevice {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value kind,
            value id,
            value version_hw,
            value version_sw,
            value heat_area_nr,
            value signal_strength,
            value battery,
            value state,
            value com_error,
            value is_on,
        });
    }
}

impl Keyed for ShiftProgram {
    fn key(&self) -> Option<u32> {
        self.nr
    }
}

impl Merge for ShiftProgram {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value shifting_time,
            value start,
            value end,
        });
    }
}

impl Merge for Program {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, { keyed shift_programs });
    }
}

impl Merge for Vacation {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value state,
            value start_date,
            value start_time,
            value end_date,
            value end_time,
        });
    }
}

impl Merge for Network {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value mac,
            value dhcp,
            value ipv6_active,
            value ipv4_actual,
            value ipv4_set,
            value ipv6_actual,
            value ipv6_set,
            value netmask_actual,
            value netmask_set,
            value dns,
            value gateway,
        });
    }
}

impl Merge for Cloud {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value user_id,
            value password,
            value m2m_server_port,
            value m2m_local_port,
            value m2m_http_port,
            value m2m_https_port,
            value m2m_server_address,
            value m2m_active,
            value m2m_state,
        });
    }
}

impl Merge for KwlCtrl {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value visible,
            value present,
            value connection,
            value url,
            value port,
            value status,
            value flow_ctrl,
        });
    }
}

impl Merge for Code {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, { value expert });
    }
}

impl Merge for PumpOutput {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value local_global,
            value kind,
            value lead_time,
            value stopping_time,
            value operation_mode,
            value min_runtime,
            value min_standstill,
        });
    }
}

impl Merge for Relais {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value function,
            value lead_time,
            value stopping_time,
            value operation_mode,
        });
    }
}

impl Merge for ChangeoverFunc {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, { value mode });
    }
}

impl Merge for EmergencyMode {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, {
            value time,
            value pwm_cycle,
            value pwm_heat,
            value pwm_cool,
        });
    }
}

impl Merge for ValveProtect {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, { value time, value duration });
    }
}

impl Merge for PumpProtect {
    fn merge(&mut self, update: &Self) {
        merge_fields!(self, update, { value time, value duration });
    }
}

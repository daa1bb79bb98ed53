// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the device model and the bus.
//!
//! # Types
//!
//! - [`HeatAreaMode`] - Operating mode of a heat area (auto/day/night)
//! - [`Explicit`] - A value whose zero is meaningful in partial updates
//! - [`format_temperature`] / [`parse_temperature`] - Two-decimal temperature text

mod explicit;
mod mode;
mod temperature;

pub use explicit::Explicit;
pub use mode::HeatAreaMode;
pub use temperature::{format_temperature, parse_temperature};

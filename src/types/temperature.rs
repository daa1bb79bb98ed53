// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Textual temperature format used on the bus.
//!
//! Temperatures travel as fixed two-decimal strings (`22.5` is `"22.50"`).

use crate::error::MessageError;

/// Formats a temperature in °C with exactly two decimal places.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::types::format_temperature;
///
/// assert_eq!(format_temperature(22.5), "22.50");
/// assert_eq!(format_temperature(7.0), "7.00");
/// ```
#[must_use]
pub fn format_temperature(value: f64) -> String {
    format!("{value:.2}")
}

/// Parses a temperature payload.
///
/// Surrounding whitespace is ignored. Non-finite values are rejected.
///
/// # Errors
///
/// Returns `MessageError::InvalidTemperature` if the payload is not a finite
/// decimal number.
pub fn parse_temperature(payload: &str) -> Result<f64, MessageError> {
    let trimmed = payload.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MessageError::InvalidTemperature(payload.to_string())),
    }
}

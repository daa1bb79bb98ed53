// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode of a heat area.
//!
//! The controller encodes the mode as a small integer (`HEATAREA_MODE`),
//! the bus uses the literal tokens `auto`, `day` and `night`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MessageError;

/// Represents the operating mode of a heat area.
///
/// `Auto` is encoded as `0`, so a mode is never considered blank when merging
/// partial updates: an update that carries a mode always applies it.
///
/// Numbers the controller reports outside `0..=2` decode to
/// [`HeatAreaMode::Unknown`] so one odd room does not reject the whole
/// snapshot. Unknown modes have no bus token and are never published.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::types::HeatAreaMode;
///
/// let mode: HeatAreaMode = "night".parse().unwrap();
/// assert_eq!(mode, HeatAreaMode::Night);
/// assert_eq!(mode.as_num(), 2);
/// assert_eq!(HeatAreaMode::Auto.as_str(), "auto");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum HeatAreaMode {
    /// Follows the weekly program.
    #[default]
    Auto,
    /// Permanent day temperature.
    Day,
    /// Permanent night temperature.
    Night,
    /// Mode number this crate does not know.
    Unknown(u8),
}

impl HeatAreaMode {
    /// All modes, in wire order.
    pub const ALL: [Self; 3] = [Self::Auto, Self::Day, Self::Night];

    /// Returns the bus token for this mode.
    ///
    /// [`HeatAreaMode::Unknown`] yields `"unknown"`, which no command accepts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Day => "day",
            Self::Night => "night",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Returns `false` for [`HeatAreaMode::Unknown`].
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns the numeric value used by the controller.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Day => 1,
            Self::Night => 2,
            Self::Unknown(num) => *num,
        }
    }
}

impl fmt::Display for HeatAreaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeatAreaMode {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "day" => Ok(Self::Day),
            "night" => Ok(Self::Night),
            _ => Err(MessageError::UnknownMode(s.to_string())),
        }
    }
}

impl From<u8> for HeatAreaMode {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Auto,
            1 => Self::Day,
            2 => Self::Night,
            other => Self::Unknown(other),
        }
    }
}

impl From<HeatAreaMode> for u8 {
    fn from(mode: HeatAreaMode) -> Self {
        mode.as_num()
    }
}

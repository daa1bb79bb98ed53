// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A value whose zero is meaningful.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wraps a value for which zero carries meaning (status flags, actuator
/// percentages).
///
/// Plain numeric fields of a partial update are skipped when they are zero.
/// Fields typed `Explicit` are applied whenever they are present, including
/// when the wrapped value is zero. On the wire the wrapper is invisible.
///
/// # Examples
///
/// ```
/// use ezr2mqtt::types::Explicit;
///
/// let closed = Explicit(0);
/// assert_eq!(closed.get(), 0);
/// assert_eq!(closed.to_string(), "0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Explicit<T>(pub T);

impl<T: Copy> Explicit<T> {
    /// Returns the wrapped value.
    #[must_use]
    pub fn get(&self) -> T {
        self.0
    }
}

impl<T> From<T> for Explicit<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T: fmt::Display> fmt::Display for Explicit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

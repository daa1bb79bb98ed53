// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity store mapping device names to controller identifiers.
//!
//! The scheduler records the identifier reported by a controller on every
//! successful poll. The router reads it before dispatching a command; a
//! missing entry means the device has not been discovered yet.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Process-lifetime mapping from device name to controller identifier.
pub trait IdentityStore: Send + Sync {
    /// Records the identifier of a device, replacing any previous one.
    fn set_id(&self, name: &str, id: &str);

    /// Returns the identifier of a device, if it has been discovered.
    fn get_id(&self, name: &str) -> Option<String>;
}

/// In-memory [`IdentityStore`].
///
/// # Examples
///
/// ```
/// use ezr2mqtt::store::{IdentityStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// assert_eq!(store.get_id("dev1"), None);
///
/// store.set_id("dev1", "ID-9");
/// assert_eq!(store.get_id("dev1").as_deref(), Some("ID-9"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    ids: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of known devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    /// Returns `true` if no device has been discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }
}

impl IdentityStore for InMemoryStore {
    fn set_id(&self, name: &str, id: &str) {
        let mut ids = self.ids.write();
        if ids.get(name).map(String::as_str) != Some(id) {
            tracing::debug!(device = %name, id = %id, "Recording device identity");
        }
        ids.insert(name.to_string(), id.to_string());
    }

    fn get_id(&self, name: &str) -> Option<String> {
        self.ids.read().get(name).cloned()
    }
}

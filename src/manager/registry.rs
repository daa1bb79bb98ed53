// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of managed devices.

use std::collections::HashMap;
use std::sync::Arc;

use super::managed_device::ManagedDevice;

/// Maps device names to managed devices.
///
/// The registry is filled once at startup and shared read-only afterwards.
/// Iteration follows registration order.
#[derive(Debug)]
pub struct DeviceRegistry<T> {
    devices: Vec<Arc<ManagedDevice<T>>>,
    by_name: HashMap<String, usize>,
}

impl<T> Default for DeviceRegistry<T> {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T> DeviceRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device under `name`.
    ///
    /// A device already registered under the same name is replaced.
    pub fn register(&mut self, name: impl Into<String>, transport: T) -> Arc<ManagedDevice<T>> {
        let name = name.into();
        let device = Arc::new(ManagedDevice::new(name.clone(), transport));

        if let Some(&index) = self.by_name.get(&name) {
            tracing::warn!(device = %name, "Replacing registered device");
            self.devices[index] = Arc::clone(&device);
        } else {
            tracing::debug!(device = %name, "Registering device");
            self.by_name.insert(name, self.devices.len());
            self.devices.push(Arc::clone(&device));
        }
        device
    }

    /// Returns the device registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ManagedDevice<T>>> {
        self.by_name.get(name).map(|&index| &self.devices[index])
    }

    /// Iterates over all devices in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ManagedDevice<T>>> {
        self.devices.iter()
    }

    /// Returns the number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A named device and its exclusive lock.

use tokio::sync::{Mutex, MutexGuard};

/// A device managed by the bridge.
///
/// The transport sits behind an async mutex. Holding the guard is the
/// single-writer discipline for that device: the router holds it while
/// sending an update, the scheduler while fetching and publishing a poll
/// cycle. Devices do not share locks.
#[derive(Debug)]
pub struct ManagedDevice<T> {
    name: String,
    transport: Mutex<T>,
}

impl<T> ManagedDevice<T> {
    /// Creates a managed device.
    pub fn new(name: impl Into<String>, transport: T) -> Self {
        Self {
            name: name.into(),
            transport: Mutex::new(transport),
        }
    }

    /// Returns the logical device name used in bus topics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquires exclusive access to the device transport.
    ///
    /// Waits until any in-flight command or poll cycle of this device is done.
    pub async fn lock(&self) -> MutexGuard<'_, T> {
        self.transport.lock().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn lock_serializes_access() {
        let device = Arc::new(ManagedDevice::new("dev1", Vec::<u32>::new()));

        let first = {
            let device = Arc::clone(&device);
            tokio::spawn(async move {
                let mut guard = device.lock().await;
                guard.push(1);
                tokio::time::sleep(Duration::from_millis(20)).await;
                guard.push(2);
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = {
            let device = Arc::clone(&device);
            tokio::spawn(async move {
                device.lock().await.push(3);
            })
        };

        first.await.unwrap();
        second.await.unwrap();
        assert_eq!(*device.lock().await, vec![1, 2, 3]);
        assert_eq!(device.name(), "dev1");
    }
}

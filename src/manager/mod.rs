// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Managed devices.
//!
//! The [`DeviceRegistry`] holds every device the bridge talks to, each one a
//! [`ManagedDevice`] pairing a name with its transport behind a per-device
//! lock.
//!
//! # Examples
//!
//! ```
//! use ezr2mqtt::manager::DeviceRegistry;
//! use ezr2mqtt::transport::MockTransport;
//!
//! # async fn example() {
//! let mut registry = DeviceRegistry::new();
//! registry.register("ezr-mock", MockTransport::new());
//!
//! let device = registry.get("ezr-mock").unwrap();
//! let transport = device.lock().await;
//! # drop(transport);
//! # }
//! ```

mod managed_device;
mod registry;

pub use managed_device::ManagedDevice;
pub use registry::DeviceRegistry;
